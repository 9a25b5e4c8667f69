//! Thread-safe handle around a [`SpectralRegistry`].
//!
//! The registry itself assumes a single owner. `SharedRegistry` puts it
//! behind an `RwLock` so several threads can upsert and query the same
//! catalog. Readers receive owned [`ObjectSnapshot`]s because references
//! cannot outlive the lock guard.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::domain::error::ValidationError;
use crate::domain::object::{ObjectSnapshot, SpectralObject};
use crate::registry::SpectralRegistry;

/// Cloneable, lock-guarded registry handle.
#[derive(Debug)]
pub struct SharedRegistry<C = SystemClock> {
    inner: Arc<RwLock<SpectralRegistry<C>>>,
}

impl<C> Clone for SharedRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::from_registry(SpectralRegistry::new())
    }
}

impl Default for SharedRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SharedRegistry<C> {
    pub fn from_registry(registry: SpectralRegistry<C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    // A panic while holding the lock cannot leave a half-applied record:
    // upsert builds the record before inserting and touch never fails.
    fn read(&self) -> RwLockReadGuard<'_, SpectralRegistry<C>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SpectralRegistry<C>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert under the write lock, returning the resulting record.
    pub fn upsert(&self, raw: &Value) -> Result<ObjectSnapshot, ValidationError> {
        self.write().upsert(raw).map(SpectralObject::to_snapshot)
    }

    pub fn get_by_id(&self, id: &str) -> Option<ObjectSnapshot> {
        self.read().get_by_id(id).map(SpectralObject::to_snapshot)
    }

    pub fn list_by_kind(&self, kind: &str) -> Vec<ObjectSnapshot> {
        project(self.read().list_by_kind(kind))
    }

    pub fn list_high_stability(&self, threshold: f64) -> Vec<ObjectSnapshot> {
        project(self.read().list_high_stability(threshold))
    }

    pub fn list_by_origin_domain(&self, domain: &str) -> Vec<ObjectSnapshot> {
        project(self.read().list_by_origin_domain(domain))
    }

    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        self.read().snapshot()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Run `f` against the registry under the read lock.
    pub fn with_read<T>(&self, f: impl FnOnce(&SpectralRegistry<C>) -> T) -> T {
        f(&self.read())
    }

    /// Run `f` against the registry under the write lock.
    pub fn with_write<T>(&self, f: impl FnOnce(&mut SpectralRegistry<C>) -> T) -> T {
        f(&mut self.write())
    }
}

fn project(objects: Vec<&SpectralObject>) -> Vec<ObjectSnapshot> {
    objects.into_iter().map(SpectralObject::to_snapshot).collect()
}
