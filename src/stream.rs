//! Response stream state machine
//!
//! Reconstructs discrete turns from untagged backend fragments. Implements
//! the Elm Architecture pattern with pure state transitions.

pub mod aggregator;
mod effect;
pub mod event;
pub mod filler;
pub mod state;
pub mod status;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use aggregator::IngestAction;
pub use effect::Effect;
pub use event::{Direction, Event};
pub use filler::is_filler;
pub use state::{
    ControllerState, CurrentTurn, ResponseStream, ResponseTurn, TurnPhase, ViewContext, ViewState,
};
pub use status::TerminalKeywords;
pub use transition::{transition, TransitionResult};
