#![allow(dead_code)]

use basic_auth::BasicAuthClient;
use basic_auth::Encoding;
use basic_auth::HashPrimitive;
use basic_auth::PasswordPolicy;
use basic_auth::SigningConfig;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use serde::Serialize;

pub const SECRET: &str = "secret";
pub const ISSUER: &str = "TEST_ISS";
pub const AUDIENCE: &str = "TEST_AUD";

/// Application-defined identity used across the integration tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppUser {
    pub username: String,
    pub roles: Vec<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

impl AppUser {
    pub fn new(username: &str, roles: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iss: None,
            aud: None,
        }
    }
}

/// Password parameters matching the reference scenario: PBKDF2-HMAC-SHA1,
/// 1000 iterations, 256 byte key, 16 byte salt, hex encoded.
pub fn reference_policy() -> PasswordPolicy {
    PasswordPolicy::new(1000, 256, 16, HashPrimitive::Sha1, Encoding::Hex)
        .expect("valid password policy")
}

pub fn signing_config() -> SigningConfig {
    SigningConfig::hmac(Algorithm::HS256, SECRET, ISSUER, AUDIENCE)
}

pub fn client<T>() -> BasicAuthClient<T> {
    BasicAuthClient::new(signing_config(), reference_policy()).expect("Failed to build client")
}

/// Install a test subscriber so `RUST_LOG=basic_auth=debug` shows library events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
