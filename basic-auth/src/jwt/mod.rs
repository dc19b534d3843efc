pub mod claims;
pub mod errors;
pub mod keys;
pub mod service;

pub use claims::BasicUser;
pub use claims::Claims;
pub use claims::RegisteredClaims;
pub use errors::TokenError;
pub use keys::algorithm_name;
pub use keys::SigningConfig;
pub use keys::SigningKey;
pub use service::TokenService;
