use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Error type for token issuance and verification.
///
/// Every variant is an authentication failure from the caller's point of view;
/// the kinds exist so integrations can decide how to map them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unsupported signing algorithm: expected {expected}, found {found}")]
    UnsupportedAlgorithm { expected: String, found: String },

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Failed to decode claims: {0}")]
    ClaimsDecode(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,
}

impl TokenError {
    /// Short, stable name of the error kind. Safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::MalformedToken(_) => "malformed_token",
            TokenError::UnsupportedAlgorithm { .. } => "unsupported_algorithm",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::ClaimsDecode(_) => "claims_decode",
            TokenError::Signing(_) => "signing",
            TokenError::Expired => "expired",
            TokenError::NotYetValid => "not_yet_valid",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            // A key from another family cannot vouch for the signature
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::SignatureInvalid
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::MalformedToken(err.to_string()),
            ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::RsaFailedSigning => TokenError::Signing(err.to_string()),
            _ => TokenError::MalformedToken(err.to_string()),
        }
    }
}
