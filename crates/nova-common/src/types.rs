//! Request and response bodies shared by the relay and its clients.

use serde::{Deserialize, Serialize};

/// GET /ask-status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskStatus {
    pub enabled: bool,
}

/// POST /toggle-ask
///
/// A body without `enabled` switches the endpoint on.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToggleAskRequest {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query string for GET /ask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskQuery {
    pub q: Option<String>,
}

/// JSON body for POST /ask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    /// Question text (or prompt for an image)
    pub q: Option<String>,

    /// Base64-encoded image, optionally as a `data:` URL
    pub image: Option<String>,

    /// Article text kept as context for later questions
    pub article: Option<String>,
}

/// Successful answer from the delegate service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

/// Error body returned with every non-2xx JSON response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON body for POST /data
#[derive(Debug, Clone, Deserialize)]
pub struct DataRequest {
    pub text: Option<String>,
}

/// Acknowledgement for POST /data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSaved {
    pub success: bool,
    pub message: String,
}

/// Freshly issued verification code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeResponse {
    pub code: String,
}

/// JSON body for POST /verify-code
///
/// `code` is kept as raw JSON: clients send it as a string or a number.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: Option<serde_json::Value>,
}

impl VerifyCodeRequest {
    /// The code as text, or `None` when it is absent or empty
    /// (`null`, `false`, `0`, `""`, `[]`, `{}`)
    pub fn code_text(&self) -> Option<String> {
        use serde_json::Value;

        match self.code.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Array(a) if a.is_empty() => None,
            Value::Object(o) if o.is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

/// Successful verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySuccess {
    pub success: bool,
}
