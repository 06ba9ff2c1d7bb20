//! Events that drive the response stream

use serde::{Deserialize, Serialize};
use std::fmt;

/// Navigation direction through the turn sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Prev => f.write_str("prev"),
            Direction::Next => f.write_str("next"),
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Backend events
    Status { text: String },
    Response { text: String },

    // User events
    Navigate { direction: Direction },
    /// The backend accepted a user-sent message
    MessageAcknowledged,
    /// The backend refused or failed to deliver a user-sent message
    SendFailed { message: String },

    // Scheduler events
    AnimationComplete,
}
