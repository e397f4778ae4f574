//! Salted credential verification.

use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Holds the salted hash of the admin password.
///
/// The hash is computed once at startup with a fresh random salt; the
/// plaintext is not kept.
pub struct CredentialChecker {
    /// PHC-formatted Argon2id hash
    hash: String,
    params: Params,
}

impl CredentialChecker {
    /// Hash `secret` with default Argon2id parameters
    pub fn from_secret(secret: &str) -> Result<Self, argon2::password_hash::Error> {
        Self::with_params(secret, Params::default())
    }

    /// Hash `secret` with explicit cost parameters
    pub fn with_params(secret: &str, params: Params) -> Result<Self, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = hasher(params.clone())
            .hash_password(secret.as_bytes(), &salt)?
            .to_string();

        Ok(Self { hash, params })
    }

    /// Constant-time check of a presented secret.
    ///
    /// Any failure inside the hash library counts as a mismatch.
    pub fn verify(&self, presented: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            tracing::error!("Stored credential hash is unreadable");
            return false;
        };

        hasher(self.params.clone())
            .verify_password(presented.as_bytes(), &parsed)
            .is_ok()
    }
}

impl std::fmt::Debug for CredentialChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChecker").finish_non_exhaustive()
    }
}

fn hasher(params: Params) -> Argon2<'static> {
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

#[cfg(test)]
pub(crate) fn cheap_params() -> Params {
    Params::new(Params::MIN_M_COST, 1, 1, None).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact_secret() {
        let checker = CredentialChecker::with_params("hunter2", cheap_params()).unwrap();
        assert!(checker.verify("hunter2"));
    }

    #[test]
    fn test_rejects_other_secrets() {
        let checker = CredentialChecker::with_params("hunter2", cheap_params()).unwrap();
        assert!(!checker.verify("hunter3"));
        assert!(!checker.verify(""));
        assert!(!checker.verify("hunter2 "));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = CredentialChecker::with_params("same", cheap_params()).unwrap();
        let b = CredentialChecker::with_params("same", cheap_params()).unwrap();
        assert_ne!(a.hash, b.hash);
        assert!(!a.hash.contains("same"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let checker = CredentialChecker::with_params("hunter2", cheap_params()).unwrap();
        let printed = format!("{:?}", checker);
        assert!(!printed.contains("argon2"));
    }
}
