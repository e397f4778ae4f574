//! One-time verification code endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};

use nova_common::{CodeResponse, RelayError, VerifyCodeRequest, VerifySuccess};

use super::{parse_json, request_body};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /generate-code (behind the bearer gate)
pub async fn generate_code(State(state): State<AppState>) -> Json<CodeResponse> {
    let code = state.codes.generate();
    tracing::info!(live_codes = state.codes.len(), "Generated verification code");

    Json(CodeResponse { code })
}

/// POST /verify-code with `{"code": ...}`
pub async fn verify_code(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<VerifySuccess>, ApiError> {
    let payload: VerifyCodeRequest = parse_json(&request_body(body)?)
        .map_err(|_| RelayError::Validation("No code provided".to_string()))?;
    let code = payload
        .code_text()
        .ok_or_else(|| RelayError::Validation("No code provided".to_string()))?;

    if state.codes.verify(&code) {
        tracing::info!("Verification code accepted");
        Ok(Json(VerifySuccess { success: true }))
    } else {
        Err(RelayError::InvalidCode.into())
    }
}
