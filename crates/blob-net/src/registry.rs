use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::endpoint::Endpoint;

/// Ordered, shareable list of endpoints.
///
/// Cloning yields another handle to the same list. Readers iterate over a
/// [`snapshot`](Self::snapshot), so an endpoint added while a poll tick is
/// running only shows up on the following tick.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    inner: Arc<RwLock<Vec<Arc<Endpoint>>>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Endpoint>>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Endpoint>>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `endpoint`, returning its index.
    pub fn push(&self, endpoint: Arc<Endpoint>) -> usize {
        let mut list = self.write();
        list.push(endpoint);
        list.len() - 1
    }

    pub fn remove(&self, index: usize) -> Option<Arc<Endpoint>> {
        let mut list = self.write();
        (index < list.len()).then(|| list.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<Arc<Endpoint>> {
        self.read().get(index).cloned()
    }

    pub fn snapshot(&self) -> Vec<Arc<Endpoint>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
