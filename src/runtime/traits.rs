//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use super::error::BackendError;
use crate::db::Database;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Push notification from the AI backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Status(String),
    Response(String),
}

/// Live subscription to backend events. Hand the id back to
/// [`Backend::unsubscribe`] on teardown.
#[derive(Debug)]
pub struct BackendSubscription {
    pub id: u64,
    pub events: mpsc::Receiver<BackendEvent>,
}

/// Client side of the AI backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Start receiving `status` and `response` events
    fn subscribe(&self) -> BackendSubscription;

    /// Stop delivering events to the given subscription
    fn unsubscribe(&self, id: u64);

    /// Deliver a user-typed message
    async fn send_text(&self, message: &str) -> Result<(), BackendError>;
}

/// String key-value persistence. Implementations never fail outward: a read
/// error is reported as a missing value and a write error is dropped.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn subscribe(&self) -> BackendSubscription {
        (**self).subscribe()
    }

    fn unsubscribe(&self, id: u64) {
        (**self).unsubscribe(id);
    }

    async fn send_text(&self, message: &str) -> Result<(), BackendError> {
        (**self).send_text(message).await
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as a `KeyValueStore`
#[derive(Clone)]
pub struct DatabaseKv {
    db: Database,
}

impl DatabaseKv {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl KeyValueStore for DatabaseKv {
    fn get(&self, key: &str) -> Option<String> {
        self.db.get_value(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Failed to read value");
            None
        })
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.db.set_value(key, value) {
            tracing::warn!(key, error = %e, "Failed to write value");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.db.remove_value(key) {
            tracing::warn!(key, error = %e, "Failed to remove value");
        }
    }
}
