//! Response stream state types

use crate::profile::Profile;
use crate::stream::status::TerminalKeywords;
use serde::{Deserialize, Serialize};

// ============================================================================
// Turns
// ============================================================================

/// Lifecycle of a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Still receiving in-place text updates
    Streaming,
    /// Frozen, text can no longer change
    Complete,
}

/// Read-only view of one turn in the stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseTurn {
    pub text: String,
    pub phase: TurnPhase,
    pub index: usize,
}

impl ResponseTurn {
    pub fn is_complete(&self) -> bool {
        self.phase == TurnPhase::Complete
    }
}

/// Ordered turn sequence plus the navigation cursor.
///
/// Settled turns and the live (streaming) turn are stored apart, so the
/// stream can never hold more than one streaming turn and the live turn is
/// always last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStream {
    settled: Vec<String>,
    live: Option<String>,
    cursor: Option<usize>,
}

impl ResponseStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.settled.len() + usize::from(self.live.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the selected turn, `None` when the stream is empty
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether the last turn is frozen. `None` on an empty stream.
    pub fn last_complete(&self) -> Option<bool> {
        if self.live.is_some() {
            Some(false)
        } else if self.settled.is_empty() {
            None
        } else {
            Some(true)
        }
    }

    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn get(&self, index: usize) -> Option<ResponseTurn> {
        if let Some(text) = self.settled.get(index) {
            return Some(ResponseTurn {
                text: text.clone(),
                phase: TurnPhase::Complete,
                index,
            });
        }
        match &self.live {
            Some(text) if index == self.settled.len() => Some(ResponseTurn {
                text: text.clone(),
                phase: TurnPhase::Streaming,
                index,
            }),
            _ => None,
        }
    }

    /// The turn under the cursor
    pub fn selected(&self) -> Option<ResponseTurn> {
        self.cursor.and_then(|i| self.get(i))
    }

    pub fn last(&self) -> Option<ResponseTurn> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn turns(&self) -> Vec<ResponseTurn> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Start a new streaming turn and select it. A previous live turn is
    /// settled first. Returns the new turn's index.
    pub fn append(&mut self, text: String) -> usize {
        self.settle_live();
        self.live = Some(text);
        let index = self.settled.len();
        self.cursor = Some(index);
        index
    }

    /// Replace the live turn's text. Returns its index, or `None` when there
    /// is no live turn to update.
    pub fn update_live(&mut self, text: String) -> Option<usize> {
        let live = self.live.as_mut()?;
        *live = text;
        Some(self.settled.len())
    }

    /// Freeze the live turn. Returns its index if one was streaming.
    pub fn settle_live(&mut self) -> Option<usize> {
        let text = self.live.take()?;
        self.settled.push(text);
        Some(self.settled.len() - 1)
    }

    pub fn select_previous(&mut self) -> Option<usize> {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                self.cursor
            }
            _ => None,
        }
    }

    pub fn select_next(&mut self) -> Option<usize> {
        match self.cursor {
            Some(i) if i + 1 < self.len() => {
                self.cursor = Some(i + 1);
                self.cursor
            }
            _ => None,
        }
    }
}

// ============================================================================
// Controller State
// ============================================================================

/// Whether the next fragment is forced to start a fresh turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    #[default]
    Idle,
    /// A user message was acknowledged by the backend
    AwaitingNewTurn,
}

/// Full view state driven by the transition function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub controller: ControllerState,
    pub stream: ResponseStream,
    /// Last displayable status string
    pub status: String,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What the view shows for the selected position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTurn {
    pub text: String,
    /// `None` when showing the profile greeting
    pub index: Option<usize>,
    pub complete: bool,
}

// ============================================================================
// Context
// ============================================================================

/// Session configuration (immutable for the session's lifetime)
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub session_id: String,
    pub profile: Profile,
    pub terminal_keywords: TerminalKeywords,
}

impl ViewContext {
    pub fn new(session_id: impl Into<String>, profile: Profile) -> Self {
        Self {
            session_id: session_id.into(),
            profile,
            terminal_keywords: TerminalKeywords::default(),
        }
    }

    pub fn with_terminal_keywords(mut self, keywords: TerminalKeywords) -> Self {
        self.terminal_keywords = keywords;
        self
    }

    /// Selected turn, or the profile greeting on an empty stream
    pub fn current(&self, stream: &ResponseStream) -> CurrentTurn {
        match stream.selected() {
            Some(turn) => CurrentTurn {
                complete: turn.is_complete(),
                text: turn.text,
                index: Some(turn.index),
            },
            None => CurrentTurn {
                text: self.profile.greeting(),
                index: None,
                complete: true,
            },
        }
    }
}
