//! Credential checking and the bearer-token request gate.

mod credential;
mod gate;

pub use credential::CredentialChecker;
pub use gate::{basic_password, require_bearer};

#[cfg(test)]
pub(crate) use credential::cheap_params;
