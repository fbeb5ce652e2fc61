//! Conversation state machine
//!
//! Pure transitions over a per-user [`Session`]; side effects are returned as
//! [`Effect`]s and executed by the runtime.

mod effect;
pub mod event;
pub mod input;
pub mod replies;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Inbound, InboundMessage};
pub use state::{ChatId, DialogueState, Session, UserId};
pub use transition::transition;
