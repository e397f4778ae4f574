//! HTTP route handlers for the relay.

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, rejection::BytesRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use nova_common::RelayError;

use crate::auth::require_bearer;
use crate::state::AppState;

mod ask;
mod codes;
mod data;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // Only /generate-code sits behind the bearer gate
    let protected = Router::new()
        .route("/generate-code", post(codes::generate_code))
        .route_layer(middleware::from_fn_with_state(
            state.credentials.clone(),
            require_bearer,
        ));

    let fallback_url = state.config.fallback_url.clone();

    Router::new()
        // Query relay
        .route("/ask-status", get(ask::ask_status))
        .route("/toggle-ask", post(ask::toggle_ask))
        .route(
            "/ask",
            get(ask::ask_get)
                .post(ask::ask_post)
                .layer(DefaultBodyLimit::max(state.config.max_ask_body_bytes)),
        )

        // Flat append log
        .route("/data", get(data::view_data).post(data::append_data))
        .route("/clear-data", post(data::clear_data))

        // Verification codes
        .route("/verify-code", post(codes::verify_code))
        .merge(protected)

        // Anything else goes to the public site
        .fallback(move || redirect(fallback_url.clone()))

        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())

        // Add shared state
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn redirect(target: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
}

/// Buffered request body, with extraction failures mapped to relay errors
fn request_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, RelayError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!("Request body exceeded the size limit");
            RelayError::PayloadTooLarge
        } else {
            tracing::debug!(error = %rejection, "Failed to read request body");
            RelayError::Validation("Invalid request body".to_string())
        }
    })
}

/// Decode a JSON request body, mapping any failure to a 400
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, RelayError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        RelayError::Validation("Invalid JSON body".to_string())
    })
}
