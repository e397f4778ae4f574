//! Request gate for protected endpoints.
//!
//! Fails closed: a missing header, a header that is not valid text, a
//! wrong scheme, or a wrong secret all produce 401 before the protected
//! handler runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};

use nova_common::{
    RelayError,
    constants::headers::{BASIC_PREFIX, BEARER_PREFIX},
};

use super::CredentialChecker;
use crate::error::ApiError;

/// Secret carried by `Authorization: Bearer <secret>`
pub fn bearer_secret(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
}

/// Password carried by `Authorization: Basic base64(user:password)`.
///
/// The user name is not checked.
pub fn basic_password(headers: &HeaderMap) -> Option<String> {
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BASIC_PREFIX))?;

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_user, password) = decoded.split_once(':')?;

    Some(password.to_string())
}

/// True when the request carries the provisioned bearer secret
pub fn is_authorized(headers: &HeaderMap, checker: &CredentialChecker) -> bool {
    match bearer_secret(headers) {
        Some(secret) => checker.verify(secret),
        None => false,
    }
}

/// Middleware wrapping routes that need the bearer secret
pub async fn require_bearer(
    State(checker): State<Arc<CredentialChecker>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_authorized(req.headers(), &checker) {
        tracing::warn!(path = %req.uri().path(), "Rejected request without valid bearer token");
        return Err(RelayError::Unauthorized.into());
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cheap_params;
    use axum::{Router, body::Body, http::{HeaderValue, Request as HttpRequest, StatusCode}, routing::post};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn checker() -> CredentialChecker {
        CredentialChecker::with_params("s3cret", cheap_params()).unwrap()
    }

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_rejects_missing_header() {
        assert!(!is_authorized(&HeaderMap::new(), &checker()));
    }

    #[test]
    fn test_rejects_wrong_scheme() {
        let checker = checker();
        assert!(!is_authorized(&headers_with("s3cret"), &checker));
        assert!(!is_authorized(&headers_with("Basic s3cret"), &checker));
        assert!(!is_authorized(&headers_with("bearer s3cret"), &checker));
    }

    #[test]
    fn test_rejects_wrong_secret() {
        assert!(!is_authorized(&headers_with("Bearer nope"), &checker()));
    }

    #[test]
    fn test_rejects_non_text_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xffs3cret").unwrap(),
        );
        assert!(!is_authorized(&headers, &checker()));
    }

    #[test]
    fn test_accepts_exact_secret() {
        assert!(is_authorized(&headers_with("Bearer s3cret"), &checker()));
    }

    #[test]
    fn test_basic_password() {
        // admin:s3cret
        let headers = headers_with("Basic YWRtaW46czNjcmV0");
        assert_eq!(basic_password(&headers).as_deref(), Some("s3cret"));

        assert!(basic_password(&headers_with("Basic !!!")).is_none());
        assert!(basic_password(&headers_with("Bearer s3cret")).is_none());
        assert!(basic_password(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn test_rejected_request_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let app = Router::new()
            .route(
                "/protected",
                post(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "ok"
                    }
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(checker()),
                require_bearer,
            ));

        let denied = app
            .clone()
            .oneshot(
                HttpRequest::post("/protected")
                    .header(header::AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let allowed = app
            .oneshot(
                HttpRequest::post("/protected")
                    .header(header::AUTHORIZATION, "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
