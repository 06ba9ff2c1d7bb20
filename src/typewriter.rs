//! Character-by-character reveal of the current turn
//!
//! Only one reveal chain may be live at a time: two chains writing into the
//! same display buffer interleave characters from different texts. Arming a
//! new reveal therefore cancels the previous chain first, and every signal a
//! chain emits carries its generation so that anything still in flight from
//! an older chain is dropped by [`TypewriterScheduler::accept`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Texts longer than this wait `long_delay` before the first character
const LONG_DELAY_THRESHOLD: usize = 50;
/// Texts longer than this reveal at `fast_interval`
const FAST_INTERVAL_THRESHOLD: usize = 100;

/// Reveal pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealSettings {
    /// When false, arming is a no-op and turns complete only via status
    pub enabled: bool,
    pub short_delay: Duration,
    pub long_delay: Duration,
    pub slow_interval: Duration,
    pub fast_interval: Duration,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            short_delay: Duration::from_millis(100),
            long_delay: Duration::from_millis(300),
            slow_interval: Duration::from_millis(20),
            fast_interval: Duration::from_millis(10),
        }
    }
}

impl RevealSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay before the first character of a `len`-character text
    pub fn initial_delay(&self, len: usize) -> Duration {
        if len > LONG_DELAY_THRESHOLD {
            self.long_delay
        } else {
            self.short_delay
        }
    }

    /// Delay between characters of a `len`-character text
    pub fn interval(&self, len: usize) -> Duration {
        if len > FAST_INTERVAL_THRESHOLD {
            self.fast_interval
        } else {
            self.slow_interval
        }
    }
}

/// Signal emitted by a reveal chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealSignal {
    Progress { generation: u64, revealed: usize },
    Complete { generation: u64 },
}

impl RevealSignal {
    pub fn generation(&self) -> u64 {
        match self {
            RevealSignal::Progress { generation, .. } | RevealSignal::Complete { generation } => {
                *generation
            }
        }
    }
}

/// Accepted signal from the current chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealUpdate {
    Progress { revealed_length: usize },
    Complete,
}

/// The reveal currently in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    pub index: usize,
    pub target_text: String,
    /// Characters revealed so far
    pub revealed_length: usize,
}

impl AnimationState {
    pub fn target_len(&self) -> usize {
        self.target_text.chars().count()
    }

    pub fn revealed_text(&self) -> String {
        self.target_text.chars().take(self.revealed_length).collect()
    }
}

struct ActiveReveal {
    generation: u64,
    animation: AnimationState,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the single reveal chain for a session
pub struct TypewriterScheduler {
    settings: RevealSettings,
    next_generation: u64,
    active: Option<ActiveReveal>,
    signal_tx: mpsc::UnboundedSender<RevealSignal>,
    running: Arc<AtomicUsize>,
}

impl TypewriterScheduler {
    /// Create a scheduler plus the receiver its chains report to
    pub fn new(settings: RevealSettings) -> (Self, mpsc::UnboundedReceiver<RevealSignal>) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            settings,
            next_generation: 0,
            active: None,
            signal_tx,
            running: Arc::new(AtomicUsize::new(0)),
        };
        (scheduler, signal_rx)
    }

    /// Cancel any live chain and start revealing `text` from the beginning.
    /// Returns the new chain's generation, or `None` when reveals are off.
    pub fn arm(&mut self, index: usize, text: &str) -> Option<u64> {
        self.cancel();
        if !self.settings.enabled {
            return None;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let len = text.chars().count();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_chain(
            generation,
            len,
            self.settings,
            cancel.clone(),
            self.signal_tx.clone(),
            ChainGuard::enter(&self.running),
        ));

        tracing::debug!(generation, index, len, "Armed reveal");
        self.active = Some(ActiveReveal {
            generation,
            animation: AnimationState {
                index,
                target_text: text.to_string(),
                revealed_length: 0,
            },
            cancel,
            handle,
        });
        Some(generation)
    }

    /// Cancel the live chain, if any. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        active.handle.abort();
        tracing::debug!(generation = active.generation, "Cancelled reveal");
        true
    }

    /// Apply a signal from a chain. Signals from cancelled or finished
    /// chains are dropped.
    pub fn accept(&mut self, signal: RevealSignal) -> Option<RevealUpdate> {
        let active = self.active.as_mut()?;
        if signal.generation() != active.generation {
            tracing::trace!(
                stale = signal.generation(),
                current = active.generation,
                "Dropping stale reveal signal"
            );
            return None;
        }
        match signal {
            RevealSignal::Progress { revealed, .. } => {
                active.animation.revealed_length = revealed;
                Some(RevealUpdate::Progress {
                    revealed_length: revealed,
                })
            }
            RevealSignal::Complete { .. } => {
                self.active = None;
                Some(RevealUpdate::Complete)
            }
        }
    }

    pub fn animation(&self) -> Option<&AnimationState> {
        self.active.as_ref().map(|a| &a.animation)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of chain tasks that have not yet exited
    pub fn running_chains(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for TypewriterScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Counts live chain tasks; decremented when the task ends or is aborted
struct ChainGuard(Arc<AtomicUsize>);

impl ChainGuard {
    fn enter(running: &Arc<AtomicUsize>) -> Self {
        running.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(running))
    }
}

impl Drop for ChainGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_chain(
    generation: u64,
    len: usize,
    settings: RevealSettings,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<RevealSignal>,
    _guard: ChainGuard,
) {
    if !pause(settings.initial_delay(len), &cancel).await {
        return;
    }
    let interval = settings.interval(len);
    for revealed in 1..=len {
        if cancel.is_cancelled() || tx.send(RevealSignal::Progress { generation, revealed }).is_err() {
            return;
        }
        if !pause(interval, &cancel).await {
            return;
        }
    }
    if !cancel.is_cancelled() {
        let _ = tx.send(RevealSignal::Complete { generation });
    }
}

/// Sleep unless cancelled first. Returns false on cancellation.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}
