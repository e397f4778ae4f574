//! HTTP boundary for relay errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use nova_common::{ErrorBody, RelayError};

/// Wraps a [`RelayError`] so handlers can return it with `?`.
///
/// Server faults are logged with their cause here; the client only gets
/// the generic public message.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_fault() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            error: self.0.public_message(),
        };

        (status, Json(body)).into_response()
    }
}
