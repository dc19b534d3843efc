//! Basic authentication helper library
//!
//! Provides reusable authentication building blocks:
//! - Signed session tokens (JWT) carrying arbitrary user claims, with the
//!   signing algorithm pinned on verification
//! - Salted PBKDF2 password hashing with constant-time verification, stored
//!   either as separate hash/salt fields or as one salt-prefixed blob
//! - A facade combining both, configured once
//!
//! The library performs no I/O besides reading the OS random source. Refresh
//! token persistence is left to callers through [`BasicAuthStorage`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use basic_auth::{Encoding, HashPrimitive, PasswordPolicy, PasswordService};
//!
//! let policy = PasswordPolicy::new(1000, 32, 16, HashPrimitive::Sha256, Encoding::Hex).unwrap();
//! let passwords = PasswordService::new(policy);
//!
//! let (hash, salt) = passwords.hash_password("my_password").unwrap();
//! assert!(passwords.verify_password(&hash, &salt, "my_password"));
//!
//! let blob = passwords.hash_password_with_encoded_salt("my_password").unwrap();
//! assert!(passwords.verify_password_with_encoded_salt(&blob, "my_password"));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use basic_auth::{BasicUser, SigningConfig, TokenService};
//! use jsonwebtoken::Algorithm;
//!
//! let config = SigningConfig::hmac(Algorithm::HS256, b"secret_key_at_least_32_bytes_long!", "my-service", "my-app");
//! let tokens = TokenService::new(config).unwrap();
//!
//! let token = tokens.issue(&BasicUser::new("alice")).unwrap();
//! let user: BasicUser = tokens.verify(&token).unwrap();
//! assert_eq!(user.username, "alice");
//! assert_eq!(user.issuer(), Some("my-service"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use basic_auth::{BasicAuthClient, BasicUser, Encoding, HashPrimitive, PasswordPolicy, PasswordRecord, SigningConfig};
//! use jsonwebtoken::Algorithm;
//!
//! let signing = SigningConfig::hmac(Algorithm::HS256, b"secret_key_at_least_32_bytes_long!", "my-service", "my-app");
//! let policy = PasswordPolicy::new(1000, 32, 16, HashPrimitive::Sha256, Encoding::Base64).unwrap();
//! let auth: BasicAuthClient<BasicUser> = BasicAuthClient::new(signing, policy).unwrap();
//!
//! // Register: hash password
//! let record = PasswordRecord::from(auth.hash_password("password123").unwrap());
//!
//! // Login: verify and issue token
//! let tokens = auth.authenticate("password123", &record, &BasicUser::new("alice")).unwrap();
//!
//! // Validate token
//! let user = auth.user_from_token(&tokens.access_token).unwrap();
//! assert_eq!(user.username, "alice");
//! ```

pub mod client;
pub mod config;
pub mod jwt;
pub mod password;
pub mod storage;

// Re-export commonly used items
pub use client::AuthTokens;
pub use client::AuthenticationError;
pub use client::BasicAuthClient;
pub use self::config::AuthConfig;
pub use self::config::AuthConfigError;
pub use jwt::BasicUser;
pub use jwt::Claims;
pub use jwt::RegisteredClaims;
pub use jwt::SigningConfig;
pub use jwt::SigningKey;
pub use jwt::TokenError;
pub use jwt::TokenService;
pub use password::Encoding;
pub use password::HashPrimitive;
pub use password::PasswordError;
pub use password::PasswordPolicy;
pub use password::PasswordRecord;
pub use password::PasswordService;
pub use storage::BasicAuthStorage;
pub use storage::InMemoryRefreshTokenStore;
