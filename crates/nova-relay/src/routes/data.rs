//! Flat append log endpoints.

use askama::Template;
use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use nova_common::{
    DataRequest, DataSaved, MessageResponse, RelayError, constants::headers::BASIC_CHALLENGE,
};

use super::{parse_json, request_body};
use crate::auth::basic_password;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "data.html")]
struct DataTemplate<'a> {
    records: &'a [String],
}

/// GET /data: record list for the admin, behind Basic auth
pub async fn view_data(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authorized = basic_password(&headers)
        .map(|password| state.credentials.verify(&password))
        .unwrap_or(false);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, BASIC_CHALLENGE)],
            ApiError(RelayError::Unauthorized),
        )
            .into_response();
    }

    match render_records(&state).await {
        Ok(html) => html.into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

async fn render_records(state: &AppState) -> Result<Html<String>, RelayError> {
    let records = state.store.read().await?;
    let page = DataTemplate { records: &records }
        .render()
        .map_err(|e| RelayError::Internal(format!("Template rendering failed: {}", e)))?;

    Ok(Html(page))
}

/// POST /data with `{"text": ...}`
pub async fn append_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DataSaved>, ApiError> {
    if !is_json(&headers) {
        tracing::warn!("Request content type is not application/json");
        return Err(RelayError::Validation("Content-Type must be application/json".to_string()).into());
    }

    let payload: DataRequest = parse_json(&request_body(body)?)?;
    let text = payload
        .text
        .ok_or_else(|| RelayError::Validation("Text data is required".to_string()))?;

    let records = state.store.append(text).await?;
    tracing::info!(records, "Data successfully added");

    Ok(Json(DataSaved {
        success: true,
        message: "Data added successfully".to_string(),
    }))
}

/// POST /clear-data
pub async fn clear_data(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    state.store.clear().await?;
    tracing::info!("Data cleared");

    Ok(Json(MessageResponse::new("Data cleared successfully.")))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
