//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real backend or database.

use super::error::BackendError;
use super::traits::*;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::mpsc;

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend with queued send results and scripted events
pub struct MockBackend {
    subscribers: Mutex<HashMap<u64, mpsc::Sender<BackendEvent>>>,
    next_id: Mutex<u64>,
    send_results: Mutex<VecDeque<Result<(), BackendError>>>,
    /// Record of all messages sent
    pub sent: Mutex<Vec<String>>,
    /// Record of unsubscribed ids
    pub unsubscribed: Mutex<Vec<u64>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
            send_results: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            unsubscribed: Mutex::new(Vec::new()),
        }
    }

    /// Queue the result of the next `send_text`. Unqueued sends succeed.
    pub fn queue_send_result(&self, result: Result<(), BackendError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub async fn emit(&self, event: BackendEvent) {
        let targets: Vec<_> = self.subscribers.lock().unwrap().values().cloned().collect();
        for tx in targets {
            let _ = tx.send(event.clone()).await;
        }
    }

    pub async fn status(&self, text: &str) {
        self.emit(BackendEvent::Status(text.to_string())).await;
    }

    pub async fn response(&self, text: &str) {
        self.emit(BackendEvent::Response(text.to_string())).await;
    }

    pub fn recorded_sends(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn subscribe(&self) -> BackendSubscription {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        let (tx, events) = mpsc::channel(64);
        self.subscribers.lock().unwrap().insert(id, tx);
        BackendSubscription { id, events }
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().unwrap().remove(&id);
        self.unsubscribed.lock().unwrap().push(id);
    }

    async fn send_text(&self, message: &str) -> Result<(), BackendError> {
        self.sent.lock().unwrap().push(message.to_string());
        self.send_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

// ============================================================================
// In-Memory Key-Value Store
// ============================================================================

/// In-memory key-value store for testing
#[derive(Default)]
pub struct InMemoryKv {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_send_results() {
        let backend = MockBackend::new();
        backend.queue_send_result(Err(BackendError::network("offline")));

        assert!(backend.send_text("first").await.is_err());
        assert!(backend.send_text("second").await.is_ok());
        assert_eq!(backend.recorded_sends(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_mock_backend_delivers_to_subscribers() {
        let backend = MockBackend::new();
        let mut sub = backend.subscribe();
        backend.response("hi").await;
        assert_eq!(sub.events.recv().await, Some(BackendEvent::Response("hi".into())));

        backend.unsubscribe(sub.id);
        assert_eq!(backend.subscriber_count(), 0);
        assert_eq!(*backend.unsubscribed.lock().unwrap(), vec![sub.id]);
    }

    #[test]
    fn test_in_memory_kv() {
        let kv = InMemoryKv::new();
        assert_eq!(kv.get("k"), None);
        kv.set("k", "v");
        assert_eq!(kv.get("k").as_deref(), Some("v"));
        kv.remove("k");
        assert_eq!(kv.get("k"), None);
    }
}
