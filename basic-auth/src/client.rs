use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::jwt::SigningConfig;
use crate::jwt::TokenError;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordPolicy;
use crate::password::PasswordRecord;
use crate::password::PasswordService;
use crate::storage::BasicAuthStorage;

/// Authentication facade combining token handling and password hashing.
///
/// Configured once with signing parameters and a password policy. `T` is the
/// identity type embedded in issued tokens and decoded back on verification.
pub struct BasicAuthClient<T> {
    tokens: TokenService,
    passwords: PasswordService,
    _identity: PhantomData<fn() -> T>,
}

/// Tokens returned by a successful sign-in.
///
/// Both fields currently hold the same token; there is no separate refresh
/// lifecycle.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Refresh token storage failed: {0}")]
    Storage(String),
}

impl<T> BasicAuthClient<T> {
    /// Create a new client.
    ///
    /// # Errors
    /// * `Signing` - The signing key is rejected for the configured algorithm
    pub fn new(signing: SigningConfig, policy: PasswordPolicy) -> Result<Self, TokenError> {
        Ok(Self {
            tokens: TokenService::new(signing)?,
            passwords: PasswordService::new(policy),
            _identity: PhantomData,
        })
    }

    pub fn token_service(&self) -> &TokenService {
        &self.tokens
    }

    pub fn password_service(&self) -> &PasswordService {
        &self.passwords
    }

    /// Hash a password for storage as separate `(hash, salt)` fields.
    ///
    /// # Errors
    /// * `RandomSource` - The OS random source failed
    pub fn hash_password(&self, password: &str) -> Result<(String, String), PasswordError> {
        self.passwords.hash_password(password)
    }

    pub fn verify_password(&self, hash: &str, salt: &str, password: &str) -> bool {
        self.passwords.verify_password(hash, salt, password)
    }

    /// Hash a password into a single encoded field with the salt prefixed.
    ///
    /// # Errors
    /// * `RandomSource` - The OS random source failed
    pub fn hash_password_with_encoded_salt(&self, password: &str) -> Result<String, PasswordError> {
        self.passwords.hash_password_with_encoded_salt(password)
    }

    pub fn verify_password_with_encoded_salt(&self, hash: &str, password: &str) -> bool {
        self.passwords.verify_password_with_encoded_salt(hash, password)
    }
}

impl<T: Serialize> BasicAuthClient<T> {
    /// Issue tokens for an identity.
    ///
    /// # Errors
    /// * `Signing` - The identity could not be serialized or signed
    pub fn sign_in(&self, user: &T) -> Result<AuthTokens, TokenError> {
        let token = self.tokens.issue(user)?;

        Ok(AuthTokens {
            access_token: token.clone(),
            refresh_token: token,
        })
    }

    /// Verify credentials and issue tokens.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match the stored record
    /// * `Token` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored: &PasswordRecord,
        user: &T,
    ) -> Result<AuthTokens, AuthenticationError> {
        if !self.passwords.verify_record(stored, password) {
            debug!("Authentication rejected: invalid credentials");
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.sign_in(user)?)
    }

    /// Issue tokens and persist the refresh token through `storage`.
    ///
    /// # Errors
    /// * `Token` - Token generation failed
    /// * `Storage` - The storage collaborator failed
    pub fn sign_in_and_store<S: BasicAuthStorage>(
        &self,
        user_id: &str,
        user: &T,
        storage: &S,
    ) -> Result<AuthTokens, AuthenticationError> {
        let tokens = self.sign_in(user)?;

        storage
            .store_user_refresh_token(user_id, &tokens.refresh_token)
            .map_err(|e| AuthenticationError::Storage(e.to_string()))?;

        Ok(tokens)
    }
}

impl<T: DeserializeOwned> BasicAuthClient<T> {
    /// Verify a token and decode the identity it carries.
    ///
    /// # Errors
    /// Any [`TokenError`] verification kind.
    pub fn user_from_token(&self, token: &str) -> Result<T, TokenError> {
        self.tokens.verify(token)
    }
}

impl<T> fmt::Debug for BasicAuthClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthClient")
            .field("tokens", &self.tokens)
            .field("passwords", &self.passwords)
            .finish()
    }
}
