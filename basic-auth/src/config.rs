use std::env;
use std::fmt;

use chrono::Duration;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::Environment;
use config::File;
use config::FileFormat;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

use crate::client::BasicAuthClient;
use crate::jwt::SigningConfig;
use crate::password::policy::DEFAULT_ITERATIONS;
use crate::password::policy::DEFAULT_KEY_LEN;
use crate::password::policy::DEFAULT_SALT_LEN;
use crate::password::Encoding;
use crate::password::HashPrimitive;
use crate::password::PasswordPolicy;

/// Environment variable prefix, e.g. `AUTH_JWT__SECRET`.
pub const ENV_PREFIX: &str = "AUTH";

/// Longest accepted token lifetime (one year).
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub algorithm: Algorithm,
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    #[serde(default)]
    pub ttl_seconds: Option<i64>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_key_len")]
    pub key_len: usize,
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,
    #[serde(default = "default_hash")]
    pub hash: HashPrimitive,
    #[serde(default = "default_encoding")]
    pub encoding: Encoding,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_key_len() -> usize {
    DEFAULT_KEY_LEN
}

fn default_salt_len() -> usize {
    DEFAULT_SALT_LEN
}

fn default_hash() -> HashPrimitive {
    HashPrimitive::Sha256
}

fn default_encoding() -> Encoding {
    Encoding::Hex
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            key_len: default_key_len(),
            salt_len: default_salt_len(),
            hash: default_hash(),
            encoding: default_encoding(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH_JWT__SECRET, AUTH_PASSWORD__ITERATIONS, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, AuthConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::load_from(
            Config::builder()
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name(&format!("config/{}", run_mode)).required(false)),
            Self::environment(),
        )
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, AuthConfigError> {
        let configuration = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Ok(configuration.try_deserialize()?)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    fn load_from(
        builder: ConfigBuilder<DefaultState>,
        environment: Environment,
    ) -> Result<Self, AuthConfigError> {
        let configuration = builder.add_source(environment).build()?;

        Ok(configuration.try_deserialize()?)
    }

    /// Split into the typed signing and password parameters.
    ///
    /// # Errors
    /// * `Invalid` - ttl outside `1..=MAX_TTL_SECONDS` or a password policy with zero values
    pub fn into_parts(self) -> Result<(SigningConfig, PasswordPolicy), AuthConfigError> {
        let mut signing = SigningConfig::hmac(
            self.jwt.algorithm,
            self.jwt.secret.as_bytes(),
            self.jwt.issuer,
            self.jwt.audience,
        );

        if let Some(seconds) = self.jwt.ttl_seconds {
            let ttl = Some(seconds)
                .filter(|s| (1..=MAX_TTL_SECONDS).contains(s))
                .and_then(Duration::try_seconds)
                .ok_or_else(|| {
                    AuthConfigError::Invalid(format!(
                        "jwt.ttl_seconds must be between 1 and {}, got {}",
                        MAX_TTL_SECONDS, seconds
                    ))
                })?;
            signing = signing.with_ttl(ttl);
        }

        let password = self.password;
        let policy = PasswordPolicy::new(
            password.iterations,
            password.key_len,
            password.salt_len,
            password.hash,
            password.encoding,
        )
        .map_err(|e| AuthConfigError::Invalid(e.to_string()))?;

        Ok((signing, policy))
    }

    /// Build a ready-to-use client from this configuration.
    pub fn build_client<T>(self) -> Result<BasicAuthClient<T>, AuthConfigError> {
        let (signing, policy) = self.into_parts()?;

        BasicAuthClient::new(signing, policy).map_err(|e| AuthConfigError::Invalid(e.to_string()))
    }
}
