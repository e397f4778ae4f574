//! Query relay endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::BytesRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};

use nova_common::{
    AskQuery, AskRequest, AskResponse, AskStatus, MessageResponse, RelayError, ToggleAskRequest,
    constants::DEFAULT_IMAGE_PROMPT,
};

use super::{parse_json, request_body};
use crate::delegate::{self, Prompt, prepare_image, with_article};
use crate::error::ApiError;
use crate::session::{session_cookie, set_cookie};
use crate::state::AppState;

/// GET /ask-status
pub async fn ask_status(State(state): State<AppState>) -> Json<AskStatus> {
    Json(AskStatus {
        enabled: state.ask_enabled(),
    })
}

/// POST /toggle-ask
pub async fn toggle_ask(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload: ToggleAskRequest = parse_json(&request_body(body)?)?;
    state.set_ask_enabled(payload.enabled);

    let word = if payload.enabled { "enabled" } else { "disabled" };
    Ok(Json(MessageResponse::new(format!(
        "Ask endpoint {} successfully.",
        word
    ))))
}

/// GET /ask?q=...
pub async fn ask_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AskQuery>,
) -> Result<Json<AskResponse>, ApiError> {
    ensure_enabled(&state)?;
    tracing::info!(method = "GET", "Received ask request");

    let question = required_question(query.q)?;
    let article = session_cookie(&headers).and_then(|cookie| state.sessions.article(cookie));
    let prompt = Prompt::Text(with_article(&question, article.as_deref()));

    let response = delegate::ask(state.delegate.as_ref(), prompt).await?;
    Ok(Json(AskResponse { response }))
}

/// POST /ask with `q`, `image`, and/or `article`
pub async fn ask_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    ensure_enabled(&state)?;
    tracing::info!(method = "POST", "Received ask request");

    let payload: AskRequest = parse_json(&request_body(body)?)?;

    if let Some(image) = payload.image.as_deref() {
        let png = prepare_image(image)?;
        let instruction = payload
            .q
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string());

        let response = delegate::ask(state.delegate.as_ref(), Prompt::Image { png, instruction }).await?;
        return Ok(Json(AskResponse { response }).into_response());
    }

    let question = required_question(payload.q)?;
    let cookie = session_cookie(&headers);

    // A fresh article replaces the session context before answering
    let (article, new_cookie) = match payload.article.filter(|a| !a.is_empty()) {
        Some(article) => {
            let sealed = state.sessions.store(cookie, article.clone());
            (Some(article), Some(sealed))
        }
        None => (cookie.and_then(|c| state.sessions.article(c)), None),
    };

    let prompt = Prompt::Text(with_article(&question, article.as_deref()));
    let response = delegate::ask(state.delegate.as_ref(), prompt).await?;

    let body = Json(AskResponse { response });
    match new_cookie {
        Some(sealed) => {
            let cookie = set_cookie(&sealed, state.config.session_ttl_secs);
            Ok(([(header::SET_COOKIE, cookie)], body).into_response())
        }
        None => Ok(body.into_response()),
    }
}

fn ensure_enabled(state: &AppState) -> Result<(), RelayError> {
    if state.ask_enabled() {
        Ok(())
    } else {
        Err(RelayError::AskDisabled)
    }
}

fn required_question(q: Option<String>) -> Result<String, RelayError> {
    match q {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => {
            tracing::warn!("No query parameter provided");
            Err(RelayError::Validation("No query parameter provided".to_string()))
        }
    }
}
