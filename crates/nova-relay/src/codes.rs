//! One-time verification codes.
//!
//! Codes are 6 random digits that stay valid for a fixed window (5 minutes
//! by default). A code can be verified successfully at most once: every
//! lookup removes it, whether it was still live or already expired.
//! Expired codes are never swept in the background, they are purged the
//! first time someone presents them.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use rand::Rng;

use nova_common::constants::CODE_LENGTH;

/// Process-wide registry of live codes
pub struct CodeRegistry {
    /// code -> expiry instant
    codes: DashMap<String, DateTime<Utc>>,
    /// How long a fresh code stays valid
    ttl: TimeDelta,
}

impl CodeRegistry {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            codes: DashMap::new(),
            ttl: TimeDelta::seconds(ttl_secs as i64),
        }
    }

    /// Issue a new code valid from now
    pub fn generate(&self) -> String {
        self.generate_at(Utc::now())
    }

    /// Issue a new code as if the current time were `now`.
    ///
    /// A collision with a live code silently replaces its expiry.
    pub fn generate_at(&self, now: DateTime<Utc>) -> String {
        self.issue(random_code(&mut rand::rng()), now)
    }

    fn issue(&self, code: String, now: DateTime<Utc>) -> String {
        let replaced = self.codes.insert(code.clone(), now + self.ttl);

        tracing::debug!(
            live_codes = self.codes.len(),
            collided = replaced.is_some(),
            "Issued verification code"
        );

        code
    }

    /// Check and consume a code
    pub fn verify(&self, code: &str) -> bool {
        self.verify_at(code, Utc::now())
    }

    /// Check and consume a code as if the current time were `now`.
    ///
    /// The code is absent from the registry afterwards regardless of the
    /// outcome. `DashMap::remove` is atomic, so concurrent callers with the
    /// same code see it at most once.
    pub fn verify_at(&self, code: &str, now: DateTime<Utc>) -> bool {
        match self.codes.remove(code) {
            Some((_, expires_at)) if now < expires_at => true,
            Some(_) => {
                tracing::debug!("Verification code expired");
                false
            }
            None => false,
        }
    }

    /// Expiry of a live code, if present
    pub fn expires_at(&self, code: &str) -> Option<DateTime<Utc>> {
        self.codes.get(code).map(|entry| *entry.value())
    }

    /// Number of codes currently held (live or not yet purged)
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Draw `CODE_LENGTH` independent uniform digits
fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
