use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::PoisonError;
use std::sync::RwLock;

/// Persistence contract for refresh tokens.
///
/// The library never persists anything on its own; callers that want refresh
/// token durability implement this against their own storage.
pub trait BasicAuthStorage: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store (or replace) the refresh token for a user.
    fn store_user_refresh_token(&self, user_id: &str, token: &str) -> Result<(), Self::Error>;

    /// Fetch the refresh token stored for a user, if any.
    fn get_user_refresh_token(&self, user_id: &str) -> Result<Option<String>, Self::Error>;
}

/// Process-local refresh token store.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BasicAuthStorage for InMemoryRefreshTokenStore {
    type Error = Infallible;

    fn store_user_refresh_token(&self, user_id: &str, token: &str) -> Result<(), Self::Error> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(user_id.to_string(), token.to_string());
        Ok(())
    }

    fn get_user_refresh_token(&self, user_id: &str) -> Result<Option<String>, Self::Error> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(user_id).cloned())
    }
}
