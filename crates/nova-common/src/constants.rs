//! Shared constants for Nova components.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

/// Default location of the flat append store
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// Where unmatched routes are redirected
pub const DEFAULT_FALLBACK_URL: &str = "https://cpmjaguar1234.github.io/nova";

/// Verification code validity (5 minutes)
pub const CODE_TTL_SECS: u64 = 300;

/// Number of digits in a verification code
pub const CODE_LENGTH: usize = 6;

/// Article session validity (30 minutes)
pub const SESSION_TTL_SECS: u64 = 1800;

/// Upper bound accepted for `code_ttl_secs` and `session_ttl_secs` (one year)
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Body limit for POST /ask, sized for base64 screenshots (32 MiB)
pub const MAX_ASK_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Images larger than this on either side are downscaled before upload
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// Prompt used for image queries that carry no question text
pub const DEFAULT_IMAGE_PROMPT: &str = "Always give me only the final, fully simplified answer - no steps, no explanations, no extra text. Do this every time. If math, give the number answer, if reading, give me the letter answer, if the question asks when something happened, look at the dates in the text.";

/// Browser origins allowed to call the relay
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://portal.achieve3000.com",
    "https://www.deltamath.com",
    "https://www.bigideasmath.com",
];

/// Gemini defaults
pub mod gemini {
    /// REST API base URL
    pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Model used for all queries
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

    /// Upstream request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}

/// Environment variable names
pub mod env {
    /// Admin password; required
    pub const APP_PASSWORD: &str = "APP_PASSWORD";

    /// Delegate service key; required
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

    /// Session signing key; random per process when unset
    pub const SECRET_KEY: &str = "SECRET_KEY";
}

/// HTTP header and cookie names
pub mod headers {
    /// Scheme prefix accepted by the request gate
    pub const BEARER_PREFIX: &str = "Bearer ";

    /// Scheme prefix for the data viewer login
    pub const BASIC_PREFIX: &str = "Basic ";

    /// Challenge sent with 401 responses from GET /data
    pub const BASIC_CHALLENGE: &str = r#"Basic realm="Login Required""#;

    /// Cookie carrying the signed article session id
    pub const SESSION_COOKIE: &str = "nova_session";
}
