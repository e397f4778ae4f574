//! # Nova Common
//!
//! Shared types, constants, and the error taxonomy used by the Nova relay.
//!
//! ## Modules
//! - `types` - Request and response bodies exchanged with browser clients
//! - `error` - Relay error kinds and their HTTP mapping
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::RelayError;
pub use types::*;
