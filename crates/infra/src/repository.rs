use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use labtrack_core::Entity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A writer panicked while holding the lock.
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}

/// Keyed storage for one entity type.
///
/// `get` reports "not found" as `Ok(None)`; errors are reserved for storage
/// failures.
pub trait Repository<E: Entity>: Send + Sync {
    fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError>;

    /// All records, oldest first.
    fn list(&self) -> Result<Vec<E>, StoreError>;

    /// Insert or replace.
    fn save(&self, entity: E) -> Result<(), StoreError>;

    /// Returns whether a record existed.
    fn delete(&self, id: &E::Id) -> Result<bool, StoreError>;
}

impl<E, R> Repository<E> for Arc<R>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<E>, StoreError> {
        (**self).list()
    }

    fn save(&self, entity: E) -> Result<(), StoreError> {
        (**self).save(entity)
    }

    fn delete(&self, id: &E::Id) -> Result<bool, StoreError> {
        (**self).delete(id)
    }
}

/// In-memory repository for tests/dev.
#[derive(Debug)]
pub struct InMemoryRepository<E: Entity> {
    inner: RwLock<BTreeMap<E::Id, E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Repository<E> for InMemoryRepository<E>
where
    E: Entity + Clone + Send + Sync,
    E::Id: Send + Sync,
{
    fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned("repository"))?;
        Ok(map.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<E>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned("repository"))?;
        Ok(map.values().cloned().collect())
    }

    fn save(&self, entity: E) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned("repository"))?;
        map.insert(*entity.id(), entity);
        Ok(())
    }

    fn delete(&self, id: &E::Id) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned("repository"))?;
        Ok(map.remove(id).is_some())
    }
}
