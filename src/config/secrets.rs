//! Secret handling utilities.
//!
//! Re-exports secrecy types so callers don't need a direct dependency.

pub use secrecy::{ExposeSecret, SecretString};
