//! Effects produced by state transitions

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel any running reveal, then start revealing `text` from scratch
    ArmReveal { index: usize, text: String },

    /// Cancel any running reveal without starting a new one
    CancelReveal,

    /// Tell the view which turn to show
    NotifyTurnChanged {
        index: usize,
        text: String,
        complete: bool,
    },

    /// Tell the view the status line changed
    NotifyStatus { text: String },
}

impl Effect {
    pub fn turn_changed(turn: &super::ResponseTurn) -> Self {
        Effect::NotifyTurnChanged {
            index: turn.index,
            text: turn.text.clone(),
            complete: turn.is_complete(),
        }
    }

    pub fn arm_reveal(turn: &super::ResponseTurn) -> Self {
        Effect::ArmReveal {
            index: turn.index,
            text: turn.text.clone(),
        }
    }
}
