pub mod errors;
pub mod kdf;
pub mod policy;
pub mod record;

pub use errors::PasswordError;
pub use kdf::PasswordService;
pub use policy::Encoding;
pub use policy::HashPrimitive;
pub use policy::PasswordPolicy;
pub use record::PasswordRecord;
