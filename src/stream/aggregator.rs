//! Append-vs-update decision for incoming response fragments

use super::filler::is_filler;
use super::state::{ControllerState, ResponseStream};

/// What to do with an incoming fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestAction {
    /// Start a new streaming turn
    Append,
    /// Replace the live turn's text in place
    Update,
}

/// Decide how `text` enters the stream.
///
/// | controller      | stream            | filler | action |
/// |-----------------|-------------------|--------|--------|
/// | AwaitingNewTurn | any               | any    | Append |
/// | Idle            | empty             | any    | Append |
/// | Idle            | last streaming    | no     | Update |
/// | Idle            | last streaming    | yes    | Append |
/// | Idle            | last complete     | any    | Append |
pub fn classify(controller: ControllerState, stream: &ResponseStream, text: &str) -> IngestAction {
    match (controller, stream.last_complete()) {
        (ControllerState::Idle, Some(false)) if !is_filler(text) => IngestAction::Update,
        _ => IngestAction::Append,
    }
}
