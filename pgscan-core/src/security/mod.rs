//! Credential handling.
//!
//! # Security Guarantees
//! - Credentials are stored in `Zeroizing` containers for automatic memory clearing
//! - Passwords are redacted from debug output, logs and error messages

mod credentials;

pub use credentials::Credentials;
