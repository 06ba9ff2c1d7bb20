//! Runtime for driving a conversation view
//!
//! One runtime per session: it owns the view state, the typewriter and the
//! saved-response repository, consumes backend events sequentially, and
//! answers commands sent through a [`ViewHandle`].

pub mod channel;
pub mod error;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use channel::ChannelBackend;
pub use error::{BackendError, BackendErrorKind, ControllerError};
pub use executor::ViewRuntime;
pub use traits::*;

use crate::saved::SavedResponse;
use crate::stream::{CurrentTurn, Direction, ResponseTurn};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Discrete events sent to the view. Reveal progress is high-volume and
/// travels separately, see [`ViewHandle::watch_reveal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    TurnChanged {
        index: usize,
        text: String,
        complete: bool,
    },
    AnimationComplete,
    StatusChanged { text: String },
}

/// Commands from the view into the runtime
#[derive(Debug)]
pub(crate) enum Command {
    Navigate {
        direction: Direction,
    },
    SendText {
        message: String,
        reply: oneshot::Sender<Result<(), ControllerError>>,
    },
    Save {
        reply: oneshot::Sender<Option<SavedResponse>>,
    },
    Delete {
        index: usize,
        reply: oneshot::Sender<Option<SavedResponse>>,
    },
    ListSaved {
        reply: oneshot::Sender<Vec<SavedResponse>>,
    },
    IsCurrentSaved {
        reply: oneshot::Sender<bool>,
    },
    Current {
        reply: oneshot::Sender<CurrentTurn>,
    },
    Turns {
        reply: oneshot::Sender<Vec<ResponseTurn>>,
    },
    Status {
        reply: oneshot::Sender<String>,
    },
    Shutdown,
}

/// Handle to interact with a running view
#[derive(Clone)]
pub struct ViewHandle {
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<ViewEvent>,
    reveal_progress: watch::Receiver<usize>,
}

impl ViewHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        broadcast_tx: broadcast::Sender<ViewEvent>,
        reveal_progress: watch::Receiver<usize>,
    ) -> Self {
        Self {
            command_tx,
            broadcast_tx,
            reveal_progress,
        }
    }

    /// Receive view events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Characters of the revealing turn shown so far (drives auto-scroll).
    /// Latest value only; resets to 0 whenever a new reveal starts.
    pub fn watch_reveal(&self) -> watch::Receiver<usize> {
        self.reveal_progress.clone()
    }

    pub async fn navigate(&self, direction: Direction) -> Result<(), ControllerError> {
        self.command_tx
            .send(Command::Navigate { direction })
            .await
            .map_err(|_| ControllerError::Stopped)
    }

    /// Send a user message. On success the next fragment starts a new turn.
    pub async fn send_text(&self, message: &str) -> Result<(), ControllerError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ControllerError::EmptyMessage);
        }
        let message = message.to_string();
        self.request(|reply| Command::SendText { message, reply })
            .await?
    }

    /// Save the selected turn. `None` if nothing new was saved.
    pub async fn save(&self) -> Result<Option<SavedResponse>, ControllerError> {
        self.request(|reply| Command::Save { reply }).await
    }

    pub async fn delete(&self, index: usize) -> Result<Option<SavedResponse>, ControllerError> {
        self.request(|reply| Command::Delete { index, reply }).await
    }

    pub async fn saved(&self) -> Result<Vec<SavedResponse>, ControllerError> {
        self.request(|reply| Command::ListSaved { reply }).await
    }

    pub async fn is_current_saved(&self) -> Result<bool, ControllerError> {
        self.request(|reply| Command::IsCurrentSaved { reply }).await
    }

    pub async fn current(&self) -> Result<CurrentTurn, ControllerError> {
        self.request(|reply| Command::Current { reply }).await
    }

    pub async fn turns(&self) -> Result<Vec<ResponseTurn>, ControllerError> {
        self.request(|reply| Command::Turns { reply }).await
    }

    pub async fn status(&self) -> Result<String, ControllerError> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Stop the runtime. Cancels any reveal and unsubscribes from the backend.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown).await;
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(command(reply))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        rx.await.map_err(|_| ControllerError::Stopped)
    }
}
