/// A stored credential, in either of the two supported storage conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordRecord {
    /// Derived key and salt persisted as two encoded fields.
    Separate { hash: String, salt: String },

    /// Single encoded field holding `salt || derived key`.
    Combined(String),
}

impl PasswordRecord {
    pub fn separate(hash: impl Into<String>, salt: impl Into<String>) -> Self {
        PasswordRecord::Separate {
            hash: hash.into(),
            salt: salt.into(),
        }
    }

    pub fn combined(blob: impl Into<String>) -> Self {
        PasswordRecord::Combined(blob.into())
    }
}

impl From<(String, String)> for PasswordRecord {
    /// Accepts the `(hash, salt)` pair returned by `hash_password`.
    fn from((hash, salt): (String, String)) -> Self {
        PasswordRecord::Separate { hash, salt }
    }
}
