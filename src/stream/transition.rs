//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects. Timers, persistence and the view are reached only
//! through the returned effects.

use super::aggregator::{classify, IngestAction};
use super::{ControllerState, Effect, Event, ViewContext, ViewState};
use super::event::Direction;

/// Status shown once the backend acknowledges a user message
pub const MESSAGE_SENT_STATUS: &str = "Message sent...";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ViewState,
    pub effects: Vec<Effect>,
    /// Set for `Response` events only
    pub ingest: Option<IngestAction>,
}

impl TransitionResult {
    pub fn new(state: ViewState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
            ingest: None,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Pure transition function. Never fails: every event has a defined outcome,
/// possibly "no change".
pub fn transition(state: &ViewState, context: &ViewContext, event: Event) -> TransitionResult {
    let mut next = state.clone();

    match event {
        // ============================================================
        // Backend fragments
        // ============================================================
        Event::Response { text } => {
            let action = classify(next.controller, &next.stream, &text);
            let effects = match action {
                IngestAction::Append => {
                    next.controller = ControllerState::Idle;
                    let index = next.stream.append(text);
                    revealed_turn(&next, index)
                }
                IngestAction::Update => match next.stream.update_live(text) {
                    // Only reveal if the user is looking at the live turn;
                    // otherwise it streams silently until navigated to.
                    Some(index) if next.stream.cursor() == Some(index) => {
                        revealed_turn(&next, index)
                    }
                    _ => vec![],
                },
            };
            let mut result = TransitionResult::new(next).with_effects(effects);
            result.ingest = Some(action);
            result
        }

        Event::Status { text } => {
            let effects = apply_status(&mut next, context, text);
            TransitionResult::new(next).with_effects(effects)
        }

        // ============================================================
        // User commands
        // ============================================================
        Event::Navigate { direction } => {
            let moved = match direction {
                Direction::Prev => next.stream.select_previous(),
                Direction::Next => next.stream.select_next(),
            };
            let Some(turn) = moved.and_then(|i| next.stream.get(i)) else {
                return TransitionResult::new(next);
            };
            TransitionResult::new(next)
                .with_effect(Effect::CancelReveal)
                .with_effect(Effect::turn_changed(&turn))
        }

        Event::MessageAcknowledged => {
            next.controller = ControllerState::AwaitingNewTurn;
            let effects = apply_status(&mut next, context, MESSAGE_SENT_STATUS.to_string());
            TransitionResult::new(next).with_effects(effects)
        }

        Event::SendFailed { message } => {
            let text = format!("Error sending message: {message}");
            let effects = apply_status(&mut next, context, text);
            TransitionResult::new(next).with_effects(effects)
        }

        // ============================================================
        // Reveal scheduler
        // ============================================================
        Event::AnimationComplete => {
            let effects = settle_live(&mut next);
            TransitionResult::new(next).with_effects(effects)
        }
    }
}

fn revealed_turn(state: &ViewState, index: usize) -> Vec<Effect> {
    match state.stream.get(index) {
        Some(turn) => vec![Effect::turn_changed(&turn), Effect::arm_reveal(&turn)],
        None => vec![],
    }
}

fn apply_status(state: &mut ViewState, context: &ViewContext, text: String) -> Vec<Effect> {
    let terminal = context.terminal_keywords.matches(&text);
    state.status.clone_from(&text);
    let mut effects = vec![Effect::NotifyStatus { text }];
    if terminal {
        effects.extend(settle_live(state));
    }
    effects
}

/// Freeze the live turn, notifying the view if it is the one on screen
fn settle_live(state: &mut ViewState) -> Vec<Effect> {
    match state.stream.settle_live() {
        Some(index) if state.stream.cursor() == Some(index) => state
            .stream
            .get(index)
            .map(|turn| vec![Effect::turn_changed(&turn)])
            .unwrap_or_default(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::stream::TurnPhase;

    fn ctx() -> ViewContext {
        ViewContext::new("test-session", Profile::from("interview"))
    }

    fn run(state: &ViewState, event: Event) -> TransitionResult {
        transition(state, &ctx(), event)
    }

    fn response(text: &str) -> Event {
        Event::Response { text: text.to_string() }
    }

    fn status(text: &str) -> Event {
        Event::Status { text: text.to_string() }
    }

    fn texts(state: &ViewState) -> Vec<String> {
        state.stream.turns().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_first_fragment_appends() {
        let result = run(&ViewState::new(), response("hello"));
        assert_eq!(result.ingest, Some(IngestAction::Append));
        assert_eq!(texts(&result.new_state), vec!["hello"]);
        assert_eq!(result.new_state.stream.cursor(), Some(0));
        assert_eq!(
            result.effects,
            vec![
                Effect::NotifyTurnChanged {
                    index: 0,
                    text: "hello".into(),
                    complete: false
                },
                Effect::ArmReveal {
                    index: 0,
                    text: "hello".into()
                },
            ]
        );
    }

    #[test]
    fn test_streaming_sequence_yields_two_turns() {
        let s0 = ViewState::new();
        let r1 = run(&s0, response("Let me think"));
        assert_eq!(r1.ingest, Some(IngestAction::Append));

        let r2 = run(&r1.new_state, response("Let me think it over"));
        assert_eq!(r2.ingest, Some(IngestAction::Update));
        assert_eq!(texts(&r2.new_state), vec!["Let me think it over"]);
        assert_eq!(r2.new_state.stream.cursor(), Some(0));
        assert!(r2.effects.contains(&Effect::ArmReveal {
            index: 0,
            text: "Let me think it over".into()
        }));

        let r3 = run(&r2.new_state, status("Listening"));
        assert_eq!(r3.new_state.stream.last_complete(), Some(true));
        assert_eq!(r3.new_state.status, "Listening");

        let r4 = run(&r3.new_state, response("Next question?"));
        assert_eq!(r4.ingest, Some(IngestAction::Append));
        assert_eq!(r4.new_state.stream.len(), 2);
        assert_eq!(r4.new_state.stream.cursor(), Some(1));
    }

    #[test]
    fn test_filler_interrupts_streaming_turn() {
        let r1 = run(&ViewState::new(), response("The answer is forty two"));
        let r2 = run(&r1.new_state, response("hmm"));
        assert_eq!(r2.ingest, Some(IngestAction::Append));
        let turns = r2.new_state.stream.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].phase, TurnPhase::Complete);
        assert_eq!(turns[1].phase, TurnPhase::Streaming);
    }

    #[test]
    fn test_non_terminal_status_keeps_turn_streaming() {
        let r1 = run(&ViewState::new(), response("Working on it"));
        let r2 = run(&r1.new_state, status("Thinking..."));
        assert_eq!(r2.new_state.stream.last_complete(), Some(false));
        assert_eq!(r2.effects, vec![Effect::NotifyStatus { text: "Thinking...".into() }]);
    }

    #[test]
    fn test_terminal_status_notifies_completion() {
        let r1 = run(&ViewState::new(), response("Done thinking"));
        let r2 = run(&r1.new_state, status("Ready"));
        assert_eq!(
            r2.effects,
            vec![
                Effect::NotifyStatus { text: "Ready".into() },
                Effect::NotifyTurnChanged {
                    index: 0,
                    text: "Done thinking".into(),
                    complete: true
                },
            ]
        );
    }

    #[test]
    fn test_acknowledged_message_forces_new_turn() {
        let r1 = run(&ViewState::new(), response("Streaming answer in progress"));
        let r2 = run(&r1.new_state, Event::MessageAcknowledged);
        assert_eq!(r2.new_state.controller, ControllerState::AwaitingNewTurn);
        assert_eq!(r2.new_state.status, MESSAGE_SENT_STATUS);

        let r3 = run(&r2.new_state, response("Streaming answer in progress, extended"));
        assert_eq!(r3.ingest, Some(IngestAction::Append));
        assert_eq!(r3.new_state.controller, ControllerState::Idle);
        assert_eq!(r3.new_state.stream.len(), 2);
    }

    #[test]
    fn test_send_failure_does_not_arm_new_turn() {
        let r1 = run(&ViewState::new(), Event::SendFailed { message: "offline".into() });
        assert_eq!(r1.new_state.controller, ControllerState::Idle);
        assert_eq!(r1.new_state.status, "Error sending message: offline");
        assert!(r1.new_state.stream.is_empty());
    }

    #[test]
    fn test_navigation_cancels_reveal_and_shows_full_text() {
        let r1 = run(&ViewState::new(), response("first answer"));
        let r2 = run(&r1.new_state, response("okay"));
        let r3 = run(&r2.new_state, Event::Navigate { direction: Direction::Prev });
        assert_eq!(r3.new_state.stream.cursor(), Some(0));
        assert_eq!(
            r3.effects,
            vec![
                Effect::CancelReveal,
                Effect::NotifyTurnChanged {
                    index: 0,
                    text: "first answer".into(),
                    complete: true
                },
            ]
        );
        assert!(!r3.effects.iter().any(|e| matches!(e, Effect::ArmReveal { .. })));
    }

    #[test]
    fn test_navigation_at_boundary_is_noop() {
        let r1 = run(&ViewState::new(), response("only"));
        for direction in [Direction::Prev, Direction::Next] {
            let r = run(&r1.new_state, Event::Navigate { direction });
            assert!(r.effects.is_empty());
            assert_eq!(r.new_state, r1.new_state);
        }

        let empty = run(&ViewState::new(), Event::Navigate { direction: Direction::Next });
        assert!(empty.effects.is_empty());
        assert_eq!(empty.new_state.stream.cursor(), None);
    }

    #[test]
    fn test_update_off_screen_streams_silently() {
        let r1 = run(&ViewState::new(), response("earlier answer"));
        let r2 = run(&r1.new_state, response("hmm"));
        let r3 = run(&r2.new_state, Event::Navigate { direction: Direction::Prev });
        let r4 = run(&r3.new_state, response("a longer substantive continuation"));
        assert_eq!(r4.ingest, Some(IngestAction::Update));
        assert!(r4.effects.is_empty());
        assert_eq!(r4.new_state.stream.cursor(), Some(0));
        assert_eq!(
            r4.new_state.stream.last().unwrap().text,
            "a longer substantive continuation"
        );
    }

    #[test]
    fn test_animation_complete_settles_live_turn() {
        let r1 = run(&ViewState::new(), response("typed out"));
        let r2 = run(&r1.new_state, Event::AnimationComplete);
        assert_eq!(r2.new_state.stream.last_complete(), Some(true));

        let r3 = run(&r2.new_state, response("typed out, then a few more words"));
        assert_eq!(r3.ingest, Some(IngestAction::Append));
    }

    #[test]
    fn test_animation_complete_without_live_turn_is_noop() {
        let r = run(&ViewState::new(), Event::AnimationComplete);
        assert!(r.effects.is_empty());
        assert!(r.new_state.stream.is_empty());
    }
}
