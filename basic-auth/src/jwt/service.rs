use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use super::claims::Claims;
use super::claims::AUDIENCE;
use super::claims::EXPIRATION;
use super::claims::ISSUED_AT;
use super::claims::ISSUER;
use super::errors::TokenError;
use super::keys::algorithm_name;
use super::keys::SigningConfig;

/// Issues and verifies signed tokens carrying arbitrary claims.
///
/// The algorithm is pinned: a token is only accepted when its header declares
/// exactly the algorithm this service was configured with, and the check runs
/// before any key material is touched.
#[derive(Clone)]
pub struct TokenService {
    config: SigningConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

impl TokenService {
    /// Create a token service, building the signing keys once.
    ///
    /// # Errors
    /// * `Signing` - The key is empty, unparsable, or does not fit the algorithm
    pub fn new(config: SigningConfig) -> Result<Self, TokenError> {
        let (encoding_key, decoding_key) = config.build_keys()?;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Sign an identity into a compact token.
    ///
    /// The identity's fields become claims. `iss` and `aud` are always taken
    /// from the configuration, overwriting whatever the identity carried.
    ///
    /// # Errors
    /// * `Signing` - The identity is not a JSON object, the ttl overflows, or
    ///   signing failed
    pub fn issue<T: Serialize>(&self, identity: &T) -> Result<String, TokenError> {
        let mut claims = Claims::from_identity(identity)?;
        claims.insert(ISSUER, self.config.issuer.clone());
        claims.insert(AUDIENCE, self.config.audience.clone());

        if let Some(ttl) = self.config.ttl {
            let now = Utc::now();
            let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
                TokenError::Signing("token lifetime overflows the expiration time".to_string())
            })?;
            claims.insert(ISSUED_AT, now.timestamp());
            claims.insert(EXPIRATION, expires_at.timestamp());
        }

        let header = Header::new(self.config.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        debug!(
            algorithm = algorithm_name(self.config.algorithm),
            claim_count = claims.len(),
            "Token issued"
        );

        Ok(token)
    }

    /// Verify a token and return its raw claim set.
    ///
    /// # Errors
    /// * `MalformedToken` - Not three segments, or header/payload cannot be decoded
    /// * `UnsupportedAlgorithm` - Header `alg` differs from the configured algorithm
    /// * `SignatureInvalid` - Signature does not match the configured key
    /// * `Expired` - `exp` claim is in the past
    /// * `NotYetValid` - `nbf` claim is in the future
    pub fn verify_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let result = self.check_algorithm(token).and_then(|()| {
            let mut validation = Validation::new(self.config.algorithm);
            // Tokens without exp are accepted, iss/aud are not enforced
            validation.required_spec_claims.clear();
            validation.validate_aud = false;
            // exp and nbf, when present, are checked without clock skew
            validation.validate_nbf = true;
            validation.leeway = 0;

            decode::<Map<String, Value>>(token, &self.decoding_key, &validation)
                .map(|data| Claims::from(data.claims))
                .map_err(TokenError::from)
        });

        if let Err(e) = &result {
            debug!(error_kind = e.kind(), "Token verification failed");
        }

        result
    }

    /// Verify a token and decode its claims into `T`.
    ///
    /// # Errors
    /// Everything [`TokenService::verify_claims`] returns, plus
    /// * `ClaimsDecode` - The verified claims do not fit `T`
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        self.verify_claims(token)?.decode()
    }

    fn check_algorithm(&self, token: &str) -> Result<(), TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
            return Err(TokenError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(segments[0])
            .map_err(|e| TokenError::MalformedToken(format!("header: {}", e)))?;
        let header: RawHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| TokenError::MalformedToken(format!("header: {}", e)))?;

        let expected = algorithm_name(self.config.algorithm);
        if header.alg != expected {
            warn!(
                expected,
                found = %header.alg,
                "Rejected token with unexpected signing algorithm"
            );
            return Err(TokenError::UnsupportedAlgorithm {
                expected: expected.to_string(),
                found: header.alg,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
