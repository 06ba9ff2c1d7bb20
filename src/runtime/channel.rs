//! In-process backend adapter
//!
//! Bridges a transport (stdio, IPC, ...) to the runtime: the transport
//! publishes backend events into the adapter, and user messages sent by the
//! runtime come out of the outbound channel for the transport to deliver.

use super::error::BackendError;
use super::traits::{Backend, BackendEvent, BackendSubscription};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

const SUBSCRIBER_BUFFER: usize = 64;

pub struct ChannelBackend {
    subscribers: Mutex<HashMap<u64, mpsc::Sender<BackendEvent>>>,
    next_id: AtomicU64,
    outbound: mpsc::Sender<String>,
}

impl ChannelBackend {
    /// Create the adapter plus the receiver of user-sent messages
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbound, outbound_rx) = mpsc::channel(buffer);
        let backend = Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            outbound,
        };
        (backend, outbound_rx)
    }

    /// Deliver an event to every live subscriber
    pub async fn publish(&self, event: BackendEvent) {
        let targets: Vec<(u64, mpsc::Sender<BackendEvent>)> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        for (id, tx) in targets {
            if tx.send(event.clone()).await.is_err() {
                tracing::debug!(subscription = id, "Dropping closed subscription");
                self.unsubscribe(id);
            }
        }
    }

    pub async fn status(&self, text: impl Into<String>) {
        self.publish(BackendEvent::Status(text.into())).await;
    }

    pub async fn response(&self, text: impl Into<String>) {
        self.publish(BackendEvent::Response(text.into())).await;
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Backend for ChannelBackend {
    fn subscribe(&self) -> BackendSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, events) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        BackendSubscription { id, events }
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    async fn send_text(&self, message: &str) -> Result<(), BackendError> {
        self.outbound
            .send(message.to_string())
            .await
            .map_err(|_| BackendError::disconnected("Backend transport is closed"))
    }
}
