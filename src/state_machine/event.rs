//! Inbound messages that drive the dialogue

use super::state::{ChatId, UserId};
use crate::search::Coordinate;

/// Content of one inbound chat message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Text(String),
    Location(Coordinate),
}

impl Inbound {
    pub fn text(text: impl Into<String>) -> Self {
        Inbound::Text(text.into())
    }

    pub fn location(latitude: f64, longitude: f64) -> Self {
        Inbound::Location(Coordinate::new(latitude, longitude))
    }
}

/// An inbound message together with who sent it and where to answer
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub payload: Inbound,
}

/// Commands accepted in every dialogue state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Start,
    Restart,
}

impl Command {
    /// Case-insensitive, surrounding whitespace ignored
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("/help") {
            Some(Command::Help)
        } else if text.eq_ignore_ascii_case("/start") {
            Some(Command::Start)
        } else if text.eq_ignore_ascii_case("/restart") {
            Some(Command::Restart)
        } else {
            None
        }
    }
}
