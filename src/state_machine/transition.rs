//! Pure state transition function
//!
//! Maps (session, inbound message) to (next session, reply, effects). No I/O:
//! cancelling or launching a search is returned as an [`Effect`] for the
//! runtime to carry out once the new session is committed.

use super::event::{Command, Inbound};
use super::input::{
    parse_date_time, parse_radius, parse_rental_end, parse_vehicle_class, InputError,
};
use super::replies;
use super::state::{DialogueState, SearchKind, Session};
use super::Effect;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub session: Session,
    pub reply: String,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session, reply: impl Into<String>) -> Self {
        Self {
            session,
            reply: reply.into(),
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Session left as it was
    fn unchanged(session: &Session, reply: impl Into<String>) -> Self {
        Self::new(session.clone(), reply)
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs.
pub fn transition(session: &Session, message: &Inbound) -> TransitionResult {
    if let Inbound::Text(text) = message {
        if let Some(command) = Command::parse(text) {
            return handle_command(session, command);
        }
    }

    let mut next = session.clone();

    match (session.state, message) {
        // ============================================================
        // Search kind
        // ============================================================
        (DialogueState::AskingType, Inbound::Text(text)) => match SearchKind::parse(text) {
            Some(kind) => {
                next.params.kind = Some(kind);
                next.state = DialogueState::AskingMargin;
                TransitionResult::new(next, replies::ASK_RADIUS)
            }
            None => TransitionResult::unchanged(session, replies::NOT_UNDERSTOOD),
        },

        // ============================================================
        // Radius
        // ============================================================
        (DialogueState::AskingMargin, Inbound::Text(text)) => match parse_radius(text) {
            Ok(radius_km) => {
                next.params.radius_km = Some(radius_km);
                next.state = DialogueState::AskingPosition;
                TransitionResult::new(next, replies::ASK_POSITION)
            }
            Err(_) => TransitionResult::unchanged(session, replies::INVALID_RADIUS),
        },

        (DialogueState::AskingMargin, Inbound::Location(_)) => {
            TransitionResult::unchanged(session, replies::INVALID_RADIUS)
        }

        // ============================================================
        // Position
        // ============================================================
        (DialogueState::AskingPosition, Inbound::Location(coordinate)) => {
            next.params.coordinate = Some(*coordinate);
            match session.params.kind {
                Some(SearchKind::Flex) => start_search(session, next),
                Some(SearchKind::Station) => {
                    next.state = DialogueState::AskingDateStart;
                    TransitionResult::new(next, replies::ask_rental_start())
                }
                None => TransitionResult::unchanged(session, replies::NOT_UNDERSTOOD),
            }
        }

        // ============================================================
        // Rental window (station only)
        // ============================================================
        (DialogueState::AskingDateStart, Inbound::Text(text)) => match parse_date_time(text) {
            Ok(start) => {
                next.params.rental_start = Some(start);
                next.state = DialogueState::AskingDateEnd;
                TransitionResult::new(next, replies::ask_rental_end())
            }
            Err(_) => TransitionResult::unchanged(session, replies::invalid_date_time()),
        },

        (DialogueState::AskingDateEnd, Inbound::Text(text)) => {
            let Some(start) = session.params.rental_start else {
                return TransitionResult::unchanged(session, replies::NOT_UNDERSTOOD);
            };
            match parse_rental_end(text, start) {
                Ok(end) => {
                    next.params.rental_end = Some(end);
                    next.state = DialogueState::AskingVehicleType;
                    TransitionResult::new(next, replies::vehicle_class_menu())
                }
                Err(InputError::EndNotAfterStart { start, .. }) => {
                    TransitionResult::unchanged(session, replies::end_not_after_start(start))
                }
                Err(_) => TransitionResult::unchanged(session, replies::invalid_date_time()),
            }
        }

        (DialogueState::AskingDateStart | DialogueState::AskingDateEnd, Inbound::Location(_)) => {
            TransitionResult::unchanged(session, replies::invalid_date_time())
        }

        // ============================================================
        // Vehicle class (station only)
        // ============================================================
        (DialogueState::AskingVehicleType, Inbound::Text(text)) => {
            match parse_vehicle_class(text) {
                Ok(class) => {
                    next.params.vehicle_class = Some(class);
                    start_search(session, next)
                }
                Err(_) => TransitionResult::unchanged(session, replies::INVALID_VEHICLE_CLASS),
            }
        }

        (DialogueState::AskingVehicleType, Inbound::Location(_)) => {
            TransitionResult::unchanged(session, replies::INVALID_VEHICLE_CLASS)
        }

        // ============================================================
        // Fall-through
        // ============================================================
        _ => TransitionResult::unchanged(session, replies::NOT_UNDERSTOOD),
    }
}

fn handle_command(session: &Session, command: Command) -> TransitionResult {
    match command {
        Command::Help => TransitionResult::unchanged(session, replies::HELP),

        Command::Start => {
            let mut next = session.clone();
            next.reset_search();
            next.state = DialogueState::AskingType;
            let result = TransitionResult::new(next, replies::GREETING);
            if session.state == DialogueState::Searching {
                result.with_effect(Effect::CancelSearch)
            } else {
                result
            }
        }

        Command::Restart if session.state == DialogueState::EndSearch => {
            start_search(session, session.clone())
        }

        Command::Restart => TransitionResult::unchanged(session, replies::RESTART_WITHOUT_SEARCH),
    }
}

/// Move `next` into `Searching` and request the launch, provided its
/// parameters form a complete request. Otherwise `current` is kept.
fn start_search(current: &Session, mut next: Session) -> TransitionResult {
    let Some(request) = next.search_request() else {
        return TransitionResult::unchanged(current, replies::RESTART_WITHOUT_SEARCH);
    };
    next.state = DialogueState::Searching;
    let reply = replies::search_started(&request);
    TransitionResult::new(next, reply).with_effect(Effect::LaunchSearch(request))
}
