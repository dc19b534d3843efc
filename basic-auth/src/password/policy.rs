use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde::Serialize;

use super::errors::PasswordError;

/// PBKDF2 iteration count used by [`PasswordPolicy::default`]
/// (OWASP 2023 recommendation for HMAC-SHA256).
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Derived key length used by [`PasswordPolicy::default`].
pub const DEFAULT_KEY_LEN: usize = 32;

/// Salt length used by [`PasswordPolicy::default`].
pub const DEFAULT_SALT_LEN: usize = 16;

/// Hash function underlying the PBKDF2 HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashPrimitive {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl fmt::Display for HashPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashPrimitive::Sha1 => "sha1",
            HashPrimitive::Sha256 => "sha256",
            HashPrimitive::Sha384 => "sha384",
            HashPrimitive::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

/// Text encoding for stored salts and derived keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Hex,
    /// Standard alphabet, padded.
    Base64,
}

impl Encoding {
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => hex::encode(bytes),
            Encoding::Base64 => STANDARD.encode(bytes),
        }
    }

    /// Decode a stored value. `None` when the text is not valid for this encoding.
    pub fn decode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Encoding::Hex => hex::decode(text).ok(),
            Encoding::Base64 => STANDARD.decode(text).ok(),
        }
    }
}

/// Password hashing parameters.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    iterations: u32,
    key_len: usize,
    salt_len: usize,
    hash: HashPrimitive,
    encoding: Encoding,
}

impl PasswordPolicy {
    /// Create a policy.
    ///
    /// # Errors
    /// * `InvalidPolicy` - Iteration count, key length or salt length is zero
    pub fn new(
        iterations: u32,
        key_len: usize,
        salt_len: usize,
        hash: HashPrimitive,
        encoding: Encoding,
    ) -> Result<Self, PasswordError> {
        if iterations == 0 {
            return Err(PasswordError::InvalidPolicy(
                "iterations must be at least 1".to_string(),
            ));
        }
        if key_len == 0 {
            return Err(PasswordError::InvalidPolicy(
                "key_len must be at least 1".to_string(),
            ));
        }
        if salt_len == 0 {
            return Err(PasswordError::InvalidPolicy(
                "salt_len must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            iterations,
            key_len,
            salt_len,
            hash,
            encoding,
        })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len
    }

    pub fn hash(&self) -> HashPrimitive {
        self.hash
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            key_len: DEFAULT_KEY_LEN,
            salt_len: DEFAULT_SALT_LEN,
            hash: HashPrimitive::Sha256,
            encoding: Encoding::Hex,
        }
    }
}
