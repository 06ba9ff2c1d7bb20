//! Property-based tests for the response stream state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::transition::*;
use super::*;
use crate::profile::Profile;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ViewContext {
    ViewContext::new("test-session", Profile::from("interview"))
}

fn run_all(events: Vec<Event>) -> Vec<(ViewState, TransitionResult)> {
    let ctx = test_context();
    let mut state = ViewState::new();
    let mut trace = Vec::with_capacity(events.len());
    for event in events {
        let result = transition(&state, &ctx, event);
        let before = std::mem::replace(&mut state, result.new_state.clone());
        trace.push((before, result));
    }
    trace
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("okay".to_string()),
        Just("hmm".to_string()),
        Just("go on".to_string()),
        "[a-z ]{1,20}",
        "[a-zA-Z ]{30,60}",
    ]
}

fn arb_status() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Ready".to_string()),
        Just("Listening...".to_string()),
        Just("Error: lost connection".to_string()),
        Just("Thinking...".to_string()),
        "[a-z ]{0,15}",
    ]
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Prev), Just(Direction::Next)]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_fragment().prop_map(|text| Event::Response { text }),
        2 => arb_status().prop_map(|text| Event::Status { text }),
        2 => arb_direction().prop_map(|direction| Event::Navigate { direction }),
        1 => Just(Event::MessageAcknowledged),
        1 => "[a-z]{1,10}".prop_map(|message| Event::SendFailed { message }),
        1 => Just(Event::AnimationComplete),
    ]
}

fn arb_idle_response_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_fragment().prop_map(|text| Event::Response { text }),
        2 => arb_status().prop_map(|text| Event::Status { text }),
        1 => Just(Event::AnimationComplete),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: cursor stays in bounds, None only when empty
    #[test]
    fn prop_cursor_in_bounds(events in proptest::collection::vec(arb_event(), 0..40)) {
        for (_, result) in run_all(events) {
            let stream = &result.new_state.stream;
            match stream.cursor() {
                Some(i) => prop_assert!(i < stream.len()),
                None => prop_assert!(stream.is_empty()),
            }
        }
    }

    // Invariant 2: at most one streaming turn, and it is the last one
    #[test]
    fn prop_single_streaming_turn_is_last(events in proptest::collection::vec(arb_event(), 0..40)) {
        for (_, result) in run_all(events) {
            let turns = result.new_state.stream.turns();
            let streaming: Vec<_> = turns
                .iter()
                .filter(|t| t.phase == TurnPhase::Streaming)
                .collect();
            prop_assert!(streaming.len() <= 1);
            if let Some(turn) = streaming.first() {
                prop_assert_eq!(turn.index, turns.len() - 1);
            }
        }
    }

    // Invariant 3: without AwaitingNewTurn, length grows only on Append
    #[test]
    fn prop_length_grows_only_on_append(
        events in proptest::collection::vec(arb_idle_response_event(), 0..40)
    ) {
        for (before, result) in run_all(events) {
            let grew = result.new_state.stream.len() - before.stream.len();
            match result.ingest {
                Some(IngestAction::Append) => prop_assert_eq!(grew, 1),
                Some(IngestAction::Update) | None => prop_assert_eq!(grew, 0),
            }
        }
    }

    // Invariant 4: the stream never shrinks
    #[test]
    fn prop_stream_never_shrinks(events in proptest::collection::vec(arb_event(), 0..40)) {
        for (before, result) in run_all(events) {
            prop_assert!(result.new_state.stream.len() >= before.stream.len());
        }
    }

    // Invariant 5: first fragment on an empty stream always appends
    #[test]
    fn prop_first_fragment_appends(text in arb_fragment(), awaiting in any::<bool>()) {
        let mut state = ViewState::new();
        if awaiting {
            state.controller = ControllerState::AwaitingNewTurn;
        }
        let result = transition(&state, &test_context(), Event::Response { text: text.clone() });
        prop_assert_eq!(result.ingest, Some(IngestAction::Append));
        prop_assert_eq!(result.new_state.stream.cursor(), Some(0));
        prop_assert_eq!(result.new_state.stream.get(0).map(|t| t.text), Some(text));
    }

    // Invariant 6: AwaitingNewTurn forces an append and is cleared by it
    #[test]
    fn prop_awaiting_forces_append(
        events in proptest::collection::vec(arb_event(), 0..20),
        text in arb_fragment()
    ) {
        let trace = run_all(events);
        let mut state = trace.last().map(|(_, r)| r.new_state.clone()).unwrap_or_default();
        state.controller = ControllerState::AwaitingNewTurn;
        let result = transition(&state, &test_context(), Event::Response { text });
        prop_assert_eq!(result.ingest, Some(IngestAction::Append));
        prop_assert_eq!(result.new_state.controller, ControllerState::Idle);
        prop_assert_eq!(result.new_state.stream.len(), state.stream.len() + 1);
    }

    // Invariant 7: navigation never arms a reveal, and moving always cancels
    #[test]
    fn prop_navigation_never_reveals(
        events in proptest::collection::vec(arb_event(), 0..30),
        direction in arb_direction()
    ) {
        let trace = run_all(events);
        let state = trace.last().map(|(_, r)| r.new_state.clone()).unwrap_or_default();
        let result = transition(&state, &test_context(), Event::Navigate { direction });
        prop_assert!(!result.effects.iter().any(|e| matches!(e, Effect::ArmReveal { .. })), "unexpected ArmReveal effect");
        if result.new_state.stream.cursor() == state.stream.cursor() {
            prop_assert!(result.effects.is_empty());
        } else {
            prop_assert_eq!(result.effects.first(), Some(&Effect::CancelReveal));
        }
    }

    // Invariant 8: every ArmReveal targets the turn's full current text
    #[test]
    fn prop_reveal_targets_full_text(events in proptest::collection::vec(arb_event(), 0..40)) {
        for (_, result) in run_all(events) {
            for effect in &result.effects {
                if let Effect::ArmReveal { index, text } = effect {
                    let turn = result.new_state.stream.get(*index);
                    prop_assert_eq!(turn.map(|t| t.text), Some(text.clone()));
                }
            }
        }
    }
}
