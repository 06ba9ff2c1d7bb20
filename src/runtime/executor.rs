//! View runtime executor

use super::traits::{Backend, BackendEvent, BackendSubscription, KeyValueStore};
use super::{Command, ControllerError, ViewEvent, ViewHandle};

use crate::saved::SavedResponseRepository;
use crate::stream::{transition, Effect, Event, ViewContext, ViewState};
use crate::typewriter::{RevealSettings, RevealSignal, RevealUpdate, TypewriterScheduler};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

const COMMAND_BUFFER: usize = 32;
const BROADCAST_BUFFER: usize = 256;

/// Generic view runtime that can work with any backend and key-value store
pub struct ViewRuntime<B, K>
where
    B: Backend + 'static,
    K: KeyValueStore + 'static,
{
    context: ViewContext,
    state: ViewState,
    backend: Arc<B>,
    saved: SavedResponseRepository<K>,
    scheduler: TypewriterScheduler,
    reveal_rx: mpsc::UnboundedReceiver<RevealSignal>,
    subscription: BackendSubscription,
    /// False once the backend closed our subscription
    backend_open: bool,
    command_rx: mpsc::Receiver<Command>,
    broadcast_tx: broadcast::Sender<ViewEvent>,
    /// Characters of the revealing turn shown so far
    reveal_tx: watch::Sender<usize>,
}

impl<B, K> ViewRuntime<B, K>
where
    B: Backend + 'static,
    K: KeyValueStore + 'static,
{
    /// Build a runtime subscribed to `backend`, plus the handle that drives it
    pub fn new(
        context: ViewContext,
        backend: Arc<B>,
        kv: K,
        reveal: RevealSettings,
    ) -> (Self, ViewHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_BUFFER);
        let (reveal_tx, reveal_progress) = watch::channel(0);
        let (scheduler, reveal_rx) = TypewriterScheduler::new(reveal);
        let subscription = backend.subscribe();

        let runtime = Self {
            context,
            state: ViewState::new(),
            backend,
            saved: SavedResponseRepository::load(kv),
            scheduler,
            reveal_rx,
            subscription,
            backend_open: true,
            command_rx,
            broadcast_tx: broadcast_tx.clone(),
            reveal_tx,
        };
        (
            runtime,
            ViewHandle::new(command_tx, broadcast_tx, reveal_progress),
        )
    }

    /// Spawn the runtime on the current tokio runtime
    pub fn spawn(
        context: ViewContext,
        backend: Arc<B>,
        kv: K,
        reveal: RevealSettings,
    ) -> (ViewHandle, tokio::task::JoinHandle<()>) {
        let (runtime, handle) = Self::new(context, backend, kv, reveal);
        (handle, tokio::spawn(runtime.run()))
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.context.session_id,
            profile = %self.context.profile,
            "Starting view runtime"
        );

        // Events are handled one at a time, never concurrently. Backend
        // events queued before a command are applied before it.
        loop {
            tokio::select! {
                biased;
                event = self.subscription.events.recv(), if self.backend_open => {
                    match event {
                        Some(event) => self.handle_backend_event(event),
                        None => {
                            tracing::warn!("Backend closed the event subscription");
                            self.backend_open = false;
                        }
                    }
                }
                Some(signal) = self.reveal_rx.recv() => {
                    self.handle_reveal_signal(signal);
                }
                command = self.command_rx.recv() => {
                    let Some(command) = command else { break };
                    if self.handle_command(command).await.is_break() {
                        break;
                    }
                }
            }
        }

        self.teardown();
    }

    fn teardown(&mut self) {
        // Apply whatever the backend delivered before we were stopped
        let mut drained = 0usize;
        while let Ok(event) = self.subscription.events.try_recv() {
            self.handle_backend_event(event);
            drained += 1;
        }
        if drained > 0 {
            tracing::debug!(drained, "Applied queued backend events on shutdown");
        }

        self.scheduler.cancel();
        self.backend.unsubscribe(self.subscription.id);
        tracing::info!(
            session_id = %self.context.session_id,
            turns = self.state.stream.len(),
            "View runtime stopped"
        );
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        let event = match event {
            BackendEvent::Status(text) => Event::Status { text },
            BackendEvent::Response(text) => Event::Response { text },
        };
        self.process_event(event);
    }

    fn handle_reveal_signal(&mut self, signal: RevealSignal) {
        match self.scheduler.accept(signal) {
            Some(RevealUpdate::Progress { revealed_length }) => {
                self.reveal_tx.send_replace(revealed_length);
            }
            Some(RevealUpdate::Complete) => {
                self.notify(ViewEvent::AnimationComplete);
                self.process_event(Event::AnimationComplete);
            }
            None => {}
        }
    }

    async fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Navigate { direction } => {
                tracing::debug!(%direction, "Navigate");
                self.process_event(Event::Navigate { direction });
            }

            Command::SendText { message, reply } => {
                let result = match self.backend.send_text(&message).await {
                    Ok(()) => {
                        self.process_event(Event::MessageAcknowledged);
                        Ok(())
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, kind = ?e.kind, "Failed to send message");
                        self.process_event(Event::SendFailed {
                            message: e.message.clone(),
                        });
                        Err(ControllerError::Backend(e))
                    }
                };
                let _ = reply.send(result);
            }

            Command::Save { reply } => {
                let current = self.context.current(&self.state.stream);
                // The greeting is not a turn and cannot be saved
                let saved = current
                    .index
                    .and_then(|_| self.saved.add(&current.text, &self.context.profile));
                let _ = reply.send(saved);
            }

            Command::Delete { index, reply } => {
                let _ = reply.send(self.saved.remove(index));
            }

            Command::ListSaved { reply } => {
                let _ = reply.send(self.saved.list().to_vec());
            }

            Command::IsCurrentSaved { reply } => {
                let current = self.context.current(&self.state.stream);
                let saved = current.index.is_some()
                    && self.saved.contains(&current.text, &self.context.profile);
                let _ = reply.send(saved);
            }

            Command::Current { reply } => {
                let _ = reply.send(self.context.current(&self.state.stream));
            }

            Command::Turns { reply } => {
                let _ = reply.send(self.state.stream.turns());
            }

            Command::Status { reply } => {
                let _ = reply.send(self.state.status.clone());
            }

            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn process_event(&mut self, event: Event) {
        let result = transition(&self.state, &self.context, event);

        if let Some(action) = result.ingest {
            tracing::debug!(
                ?action,
                turns = result.new_state.stream.len(),
                "Ingested response fragment"
            );
        }
        if self.state.stream.has_live() && !result.new_state.stream.has_live() {
            tracing::info!(turns = result.new_state.stream.len(), "Turn complete");
        }

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ArmReveal { index, text } => {
                // arm() cancels the previous chain before starting this one
                if self.scheduler.arm(index, &text).is_some() {
                    self.reveal_tx.send_replace(0);
                }
            }
            Effect::CancelReveal => {
                self.scheduler.cancel();
            }
            Effect::NotifyTurnChanged {
                index,
                text,
                complete,
            } => {
                self.notify(ViewEvent::TurnChanged {
                    index,
                    text,
                    complete,
                });
            }
            Effect::NotifyStatus { text } => {
                self.notify(ViewEvent::StatusChanged { text });
            }
        }
    }

    fn notify(&self, event: ViewEvent) {
        // No receivers is fine: the view may not be attached yet
        let _ = self.broadcast_tx.send(event);
    }
}
