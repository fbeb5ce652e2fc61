//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary message sequences.

use super::event::Inbound;
use super::replies;
use super::state::*;
use super::transition::*;
use super::Effect;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// One step of a simulated conversation. `SearchDone` stands in for the
/// orchestrator moving a finished search to `EndSearch`.
#[derive(Debug, Clone)]
enum Step {
    Message(Inbound),
    SearchDone,
}

fn arb_command() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/start".to_string()),
        Just("/START".to_string()),
        Just("/help".to_string()),
        Just("/restart".to_string()),
    ]
}

fn arb_answer() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("flex".to_string()),
        Just("station".to_string()),
        (-5.0f64..50.0).prop_map(|r| format!("{r:.1}")),
        "[a-z]{0,8}",
        (0u32..10).prop_map(|c| c.to_string()),
        (0u32..28, 0u32..24).prop_map(|(d, h)| format!("2024-02-{:02} {:02}:00", d + 1, h)),
    ]
}

fn arb_location() -> impl Strategy<Value = Inbound> {
    (-90.0f64..90.0, -180.0f64..180.0).prop_map(|(lat, lon)| Inbound::location(lat, lon))
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => arb_command().prop_map(|t| Step::Message(Inbound::Text(t))),
        6 => arb_answer().prop_map(|t| Step::Message(Inbound::Text(t))),
        2 => arb_location().prop_map(Step::Message),
        1 => Just(Step::SearchDone),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

/// Fields are only set once the dialogue has moved past the state setting them.
fn is_consistent(session: &Session) -> bool {
    let p = &session.params;
    match session.state {
        DialogueState::NotSearching | DialogueState::AskingType => p.is_empty(),
        DialogueState::AskingMargin => {
            p.kind.is_some() && p.radius_km.is_none() && p.coordinate.is_none()
        }
        DialogueState::AskingPosition => {
            p.kind.is_some() && p.radius_km.is_some_and(|r| r > 0.0) && p.coordinate.is_none()
        }
        DialogueState::AskingDateStart => {
            p.kind == Some(SearchKind::Station)
                && p.coordinate.is_some()
                && p.rental_start.is_none()
        }
        DialogueState::AskingDateEnd => p.rental_start.is_some() && p.rental_end.is_none(),
        DialogueState::AskingVehicleType => match (p.rental_start, p.rental_end) {
            (Some(start), Some(end)) => end > start && p.vehicle_class.is_none(),
            _ => false,
        },
        DialogueState::Searching | DialogueState::EndSearch => session.search_request().is_some(),
    }
}

fn effects_are_valid(before: &Session, result: &TransitionResult) -> bool {
    for effect in &result.effects {
        match effect {
            Effect::CancelSearch => {
                if before.state != DialogueState::Searching {
                    return false;
                }
            }
            Effect::LaunchSearch(request) => {
                if result.session.state != DialogueState::Searching
                    || result.session.search_request().as_ref() != Some(request)
                {
                    return false;
                }
            }
        }
    }

    let launches = result
        .effects
        .iter()
        .filter(|e| matches!(e, Effect::LaunchSearch(_)))
        .count();
    let entered_search = before.state != DialogueState::Searching
        && result.session.state == DialogueState::Searching;
    launches == usize::from(entered_search)
}

fn new_session() -> Session {
    Session::new(UserId(1), ChatId(1))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: sessions stay consistent and effects match the new state
    #[test]
    fn prop_transitions_preserve_consistency(steps in proptest::collection::vec(arb_step(), 0..40)) {
        let mut session = new_session();

        for step in steps {
            match step {
                Step::Message(message) => {
                    let result = transition(&session, &message);
                    prop_assert!(
                        effects_are_valid(&session, &result),
                        "Invalid effects {:?} for {:?} -> {:?}",
                        result.effects,
                        session.state,
                        result.session.state
                    );
                    session = result.session;
                }
                Step::SearchDone => {
                    if session.state == DialogueState::Searching {
                        session.state = DialogueState::EndSearch;
                    }
                }
            }
            prop_assert!(is_consistent(&session), "Inconsistent session: {:?}", session);
        }
    }

    // Invariant 2: /start from any reachable state resets the search
    #[test]
    fn prop_start_always_resets(steps in proptest::collection::vec(arb_step(), 0..30)) {
        let mut session = new_session();
        for step in steps {
            match step {
                Step::Message(message) => session = transition(&session, &message).session,
                Step::SearchDone => {
                    if session.state == DialogueState::Searching {
                        session.state = DialogueState::EndSearch;
                    }
                }
            }
        }

        let result = transition(&session, &Inbound::text("/start"));
        prop_assert_eq!(result.session.state, DialogueState::AskingType);
        prop_assert!(result.session.params.is_empty());
        prop_assert_eq!(
            result.effects.contains(&Effect::CancelSearch),
            session.state == DialogueState::Searching
        );
    }

    // Invariant 3: the transition is deterministic
    #[test]
    fn prop_transition_is_deterministic(
        steps in proptest::collection::vec(arb_step(), 0..20),
        last in arb_step()
    ) {
        let mut session = new_session();
        for step in steps {
            if let Step::Message(message) = step {
                session = transition(&session, &message).session;
            }
        }
        if let Step::Message(message) = last {
            prop_assert_eq!(transition(&session, &message), transition(&session, &message));
        }
    }

    // Invariant 4: a rejected radius never changes the session
    #[test]
    fn prop_rejected_radius_keeps_session(input in "[a-z ]{0,6}|-[0-9]{1,3}") {
        let mut session = new_session();
        session.state = DialogueState::AskingMargin;
        session.params.kind = Some(SearchKind::Flex);

        let result = transition(&session, &Inbound::Text(input));
        prop_assert_eq!(&result.session, &session);
        prop_assert_eq!(result.reply.as_str(), replies::INVALID_RADIUS);
        prop_assert!(result.effects.is_empty());
    }

    // Invariant 5: /help never changes anything
    #[test]
    fn prop_help_is_inert(steps in proptest::collection::vec(arb_step(), 0..20)) {
        let mut session = new_session();
        for step in steps {
            if let Step::Message(message) = step {
                session = transition(&session, &message).session;
            }
        }
        let result = transition(&session, &Inbound::text("/help"));
        prop_assert_eq!(result.session, session);
        prop_assert!(result.effects.is_empty());
    }
}
