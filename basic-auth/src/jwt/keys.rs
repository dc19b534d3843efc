use std::fmt;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::TokenError;

/// Key material used to sign and verify tokens.
///
/// HMAC algorithms take a shared secret; the asymmetric families take a PEM
/// encoded private key for signing and the matching public key for verifying.
#[derive(Clone)]
pub enum SigningKey {
    Secret(Vec<u8>),
    RsaPem {
        private_pem: Vec<u8>,
        public_pem: Vec<u8>,
    },
    EcPem {
        private_pem: Vec<u8>,
        public_pem: Vec<u8>,
    },
    EdPem {
        private_pem: Vec<u8>,
        public_pem: Vec<u8>,
    },
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = match self {
            SigningKey::Secret(_) => "Secret",
            SigningKey::RsaPem { .. } => "RsaPem",
            SigningKey::EcPem { .. } => "EcPem",
            SigningKey::EdPem { .. } => "EdPem",
        };
        write!(f, "SigningKey::{}(<redacted>)", family)
    }
}

/// Token signing parameters.
///
/// Immutable once handed to the token service. `issuer` and `audience` are
/// stamped onto every issued token and take precedence over caller claims.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub algorithm: Algorithm,
    pub key: SigningKey,
    pub issuer: String,
    pub audience: String,
    /// Token lifetime. `None` issues tokens without `iat`/`exp`.
    pub ttl: Option<Duration>,
}

impl SigningConfig {
    pub fn new(
        algorithm: Algorithm,
        key: SigningKey,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            algorithm,
            key,
            issuer: issuer.into(),
            audience: audience.into(),
            ttl: None,
        }
    }

    /// Shared-secret configuration for the HS* family.
    ///
    /// # Security Notes
    /// - The secret should be at least as long as the hash output (32 bytes for HS256)
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn hmac(
        algorithm: Algorithm,
        secret: impl AsRef<[u8]>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self::new(
            algorithm,
            SigningKey::Secret(secret.as_ref().to_vec()),
            issuer,
            audience,
        )
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Build the encoding/decoding key pair for the configured algorithm.
    ///
    /// # Errors
    /// * `Signing` - Empty secret, key family does not match the algorithm, or
    ///   the PEM material cannot be parsed
    pub(crate) fn build_keys(&self) -> Result<(EncodingKey, DecodingKey), TokenError> {
        match (family(self.algorithm), &self.key) {
            (KeyFamily::Hmac, SigningKey::Secret(secret)) => {
                if secret.is_empty() {
                    return Err(TokenError::Signing(
                        "HMAC secret must not be empty".to_string(),
                    ));
                }
                Ok((
                    EncodingKey::from_secret(secret),
                    DecodingKey::from_secret(secret),
                ))
            }
            (
                KeyFamily::Rsa,
                SigningKey::RsaPem {
                    private_pem,
                    public_pem,
                },
            ) => Ok((
                EncodingKey::from_rsa_pem(private_pem)?,
                DecodingKey::from_rsa_pem(public_pem)?,
            )),
            (
                KeyFamily::Ec,
                SigningKey::EcPem {
                    private_pem,
                    public_pem,
                },
            ) => Ok((
                EncodingKey::from_ec_pem(private_pem)?,
                DecodingKey::from_ec_pem(public_pem)?,
            )),
            (
                KeyFamily::Ed,
                SigningKey::EdPem {
                    private_pem,
                    public_pem,
                },
            ) => Ok((
                EncodingKey::from_ed_pem(private_pem)?,
                DecodingKey::from_ed_pem(public_pem)?,
            )),
            (_, key) => Err(TokenError::Signing(format!(
                "{:?} cannot be used with {}",
                key,
                algorithm_name(self.algorithm)
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

fn family(algorithm: Algorithm) -> KeyFamily {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => KeyFamily::Rsa,
        Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
        Algorithm::EdDSA => KeyFamily::Ed,
    }
}

/// The `alg` header value for an algorithm, as it appears on the wire.
pub fn algorithm_name(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        Algorithm::ES256 => "ES256",
        Algorithm::ES384 => "ES384",
        Algorithm::RS256 => "RS256",
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        Algorithm::PS256 => "PS256",
        Algorithm::PS384 => "PS384",
        Algorithm::PS512 => "PS512",
        Algorithm::EdDSA => "EdDSA",
    }
}
