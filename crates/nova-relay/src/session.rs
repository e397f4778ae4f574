//! Article sessions.
//!
//! A client that posts an `article` along with a question gets a signed
//! session cookie. Later questions from the same client are answered with
//! that article as context. Cookie format: `<id>.<sig>` where `sig` is
//! HMAC-SHA256 of the id under the process secret key.

use axum::http::{HeaderMap, header};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac, digest::InvalidLength};
use rand::Rng;
use sha2::Sha256;

use nova_common::constants::headers::SESSION_COOKIE;

type HmacSha256 = Hmac<Sha256>;

struct StoredArticle {
    article: String,
    expires_at: DateTime<Utc>,
}

/// In-memory article store keyed by signed session ids
pub struct ArticleSessions {
    mac: HmacSha256,
    sessions: DashMap<String, StoredArticle>,
    ttl: TimeDelta,
}

impl ArticleSessions {
    pub fn new(secret_key: &[u8], ttl_secs: u64) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret_key)?,
            sessions: DashMap::new(),
            ttl: TimeDelta::seconds(ttl_secs as i64),
        })
    }

    /// Remember `article` for the client and return the cookie value to set.
    ///
    /// A valid existing cookie keeps its session id.
    pub fn store(&self, cookie: Option<&str>, article: String) -> String {
        self.store_at(cookie, article, Utc::now())
    }

    pub fn store_at(&self, cookie: Option<&str>, article: String, now: DateTime<Utc>) -> String {
        let id = cookie
            .and_then(|value| self.open(value))
            .unwrap_or_else(new_session_id);

        // Abandoned sessions are reclaimed on every write
        let before = self.sessions.len();
        self.sessions.retain(|_, stored| now < stored.expires_at);
        let reclaimed = before.saturating_sub(self.sessions.len());
        if reclaimed > 0 {
            tracing::debug!(reclaimed, "Expired article sessions dropped");
        }

        self.sessions.insert(
            id.clone(),
            StoredArticle {
                article,
                expires_at: now + self.ttl,
            },
        );
        tracing::info!(sessions = self.sessions.len(), "Article content stored in session");

        self.seal(&id)
    }

    /// Article stored for a cookie, if the signature checks out and the
    /// session is still live
    pub fn article(&self, cookie: &str) -> Option<String> {
        self.article_at(cookie, Utc::now())
    }

    pub fn article_at(&self, cookie: &str, now: DateTime<Utc>) -> Option<String> {
        let id = self.open(cookie)?;

        // Expired sessions are dropped when touched
        let expired = self.sessions.remove_if(&id, |_, stored| now >= stored.expires_at);
        if expired.is_some() {
            tracing::debug!("Article session expired");
            return None;
        }

        self.sessions.get(&id).map(|stored| stored.article.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// `id.sig`
    fn seal(&self, id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", id, sig)
    }

    /// Session id from a cookie value, if the signature is valid
    fn open(&self, cookie: &str) -> Option<String> {
        let (id, sig) = cookie.split_once('.')?;
        let sig = URL_SAFE_NO_PAD.decode(sig).ok()?;

        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&sig).ok()?;

        Some(id.to_string())
    }
}

fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Value of the session cookie in the request, if any
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// `Set-Cookie` header value for a sealed session id
pub fn set_cookie(value: &str, ttl_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}",
        SESSION_COOKIE, value, ttl_secs
    )
}
