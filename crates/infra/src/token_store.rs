use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use labtrack_auth::AccountToken;
use labtrack_core::UserId;

use crate::StoreError;

/// Storage for account tokens.
///
/// Lookups are by token string; each user holds at most one token.
pub trait TokenStore: Send + Sync {
    fn find_by_token(&self, token: &str) -> Result<Option<AccountToken>, StoreError>;

    /// Delete every token of the user, whatever its kind, and insert `token`,
    /// as one atomic step.
    fn replace_for_user(&self, token: AccountToken) -> Result<(), StoreError>;

    /// Remove `token` and return it, or `None` if it is not stored.
    fn take(&self, token: &str) -> Result<Option<AccountToken>, StoreError>;

    /// Delete every token of the user, of every kind, returning what was
    /// removed.
    fn delete_all_for_user(&self, user_id: UserId) -> Result<Vec<AccountToken>, StoreError>;

    fn list_for_user(&self, user_id: UserId) -> Result<Vec<AccountToken>, StoreError>;
}

impl<S> TokenStore for Arc<S>
where
    S: TokenStore + ?Sized,
{
    fn find_by_token(&self, token: &str) -> Result<Option<AccountToken>, StoreError> {
        (**self).find_by_token(token)
    }

    fn replace_for_user(&self, token: AccountToken) -> Result<(), StoreError> {
        (**self).replace_for_user(token)
    }

    fn take(&self, token: &str) -> Result<Option<AccountToken>, StoreError> {
        (**self).take(token)
    }

    fn delete_all_for_user(&self, user_id: UserId) -> Result<Vec<AccountToken>, StoreError> {
        (**self).delete_all_for_user(user_id)
    }

    fn list_for_user(&self, user_id: UserId) -> Result<Vec<AccountToken>, StoreError> {
        (**self).list_for_user(user_id)
    }
}

/// In-memory token store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    by_token: RwLock<HashMap<String, AccountToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn find_by_token(&self, token: &str) -> Result<Option<AccountToken>, StoreError> {
        let map = self.by_token.read().map_err(|_| StoreError::Poisoned("token store"))?;
        Ok(map.get(token).cloned())
    }

    fn replace_for_user(&self, token: AccountToken) -> Result<(), StoreError> {
        let mut map = self.by_token.write().map_err(|_| StoreError::Poisoned("token store"))?;
        map.retain(|_, t| t.user_id != token.user_id);
        map.insert(token.token.clone(), token);
        Ok(())
    }

    fn take(&self, token: &str) -> Result<Option<AccountToken>, StoreError> {
        let mut map = self.by_token.write().map_err(|_| StoreError::Poisoned("token store"))?;
        Ok(map.remove(token))
    }

    fn delete_all_for_user(&self, user_id: UserId) -> Result<Vec<AccountToken>, StoreError> {
        let mut map = self.by_token.write().map_err(|_| StoreError::Poisoned("token store"))?;
        let keys: Vec<String> = map
            .iter()
            .filter(|(_, t)| t.user_id == user_id)
            .map(|(k, _)| k.clone())
            .collect();
        Ok(keys.iter().filter_map(|k| map.remove(k)).collect())
    }

    fn list_for_user(&self, user_id: UserId) -> Result<Vec<AccountToken>, StoreError> {
        let map = self.by_token.read().map_err(|_| StoreError::Poisoned("token store"))?;
        Ok(map.values().filter(|t| t.user_id == user_id).cloned().collect())
    }
}
