use thiserror::Error;

/// Error type for password operations.
///
/// Verification never produces one of these; a malformed or mismatched record
/// is reported as `false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Secure random source unavailable: {0}")]
    RandomSource(String),

    #[error("Invalid password policy: {0}")]
    InvalidPolicy(String),
}
