//! Saved location storage trait, observer plumbing and error types.
//!
//! This module defines the `SavedLocationBackend` trait that the repository
//! writes through, plus the subscription handle returned to observers of the
//! saved location list.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use skycast_core::DatabaseError;
use thiserror::Error;

/// A user-saved location as persisted. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedWeatherLocation {
    pub id: String,
    pub name_of_location: String,
    pub latitude: String,
    pub longitude: String,
}

/// Errors that can occur during saved location storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Saved location not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "That location is not in your saved list.",
            Self::Validation(_) => "The location could not be saved.",
            Self::Database(e) => e.user_message(),
        }
    }
}

/// Result type for saved location storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Receives the full saved location list.
///
/// Runs on the thread that performed the mutation, while the store is
/// locked. Callbacks must hand work off rather than call back into the store.
pub type LocationsCallback = Box<dyn Fn(&[SavedWeatherLocation]) + Send + Sync>;

/// Trait for saved location storage backends.
pub trait SavedLocationBackend: Send + Sync {
    /// Insert a record, replacing any existing record with the same `id`.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` if `id` or `name_of_location` is blank.
    fn insert_or_replace(&self, record: SavedWeatherLocation) -> StoreResult<()>;

    /// Delete a record by id.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no record has that id.
    fn delete(&self, id: &str) -> StoreResult<()>;

    fn get(&self, id: &str) -> StoreResult<Option<SavedWeatherLocation>>;

    /// All records, ordered by name (case-insensitive) then id.
    fn list(&self) -> StoreResult<Vec<SavedWeatherLocation>>;

    /// Deliver the current list to `callback` now, then again after every committed change.
    ///
    /// Observation stops when the returned `Subscription` is cancelled or dropped.
    fn observe_all(&self, callback: LocationsCallback) -> StoreResult<Subscription>;
}

/// Validate a record before it is written.
pub fn validate_record(record: &SavedWeatherLocation) -> StoreResult<()> {
    if record.id.trim().is_empty() {
        return Err(StoreError::validation("Location id cannot be empty"));
    }
    if record.name_of_location.trim().is_empty() {
        return Err(StoreError::validation("Location name cannot be empty"));
    }
    Ok(())
}

/// Registered list observers, keyed by subscription id.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    observers: Mutex<HashMap<u64, Arc<LocationsCallback>>>,
}

impl ObserverRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(self: &Arc<Self>, callback: LocationsCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().insert(id, Arc::new(callback));
        tracing::debug!("Registered saved location observer {}", id);

        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn unregister(&self, id: u64) {
        if self.observers.lock().remove(&id).is_some() {
            tracing::debug!("Removed saved location observer {}", id);
        }
    }

    /// Call every observer with `records`. The registry lock is released first,
    /// so observers may drop their own subscription.
    pub fn notify(&self, records: &[SavedWeatherLocation]) {
        let observers: Vec<Arc<LocationsCallback>> =
            self.observers.lock().values().cloned().collect();

        for observer in observers {
            observer(records);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for an active `observe_all` registration. Unsubscribes on drop.
#[must_use = "dropping a Subscription stops observation immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<ObserverRegistry>,
}

impl Subscription {
    /// Stop receiving updates.
    pub fn cancel(self) {}

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.observers.lock().contains_key(&self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn record(id: &str, name: &str) -> SavedWeatherLocation {
        SavedWeatherLocation {
            id: id.to_string(),
            name_of_location: name.to_string(),
            latitude: "0".to_string(),
            longitude: "0".to_string(),
        }
    }

    #[test]
    fn test_validate_record() {
        assert!(validate_record(&record("1", "Home")).is_ok());
        assert!(matches!(
            validate_record(&record(" ", "Home")),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            validate_record(&record("1", "")),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_notify_reaches_registered_observers() {
        let registry = ObserverRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let _sub = registry.register(Box::new(move |records| {
            counter.fetch_add(records.len(), Ordering::SeqCst);
        }));

        registry.notify(&[record("1", "Home"), record("2", "Work")]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = ObserverRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let sub = registry.register(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(sub.is_active());
        assert_eq!(registry.len(), 1);

        sub.cancel();
        registry.notify(&[]);

        assert!(registry.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry = ObserverRegistry::new();
        let sub = registry.register(Box::new(|_| {}));
        drop(registry);

        assert!(!sub.is_active());
        drop(sub);
    }
}
