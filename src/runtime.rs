//! Runtime wiring the state machine to the outside world
//!
//! The executor runs each inbound message through the state machine under the
//! shared lock; the orchestrator supervises the searches it launches.

mod executor;
mod orchestrator;
pub mod traits;


pub use executor::BotRuntime;
pub use traits::*;

use crate::state_machine::ChatId;
use crate::transport::ConsoleSink;

/// Type alias for the runtime the binary runs
pub type ProductionRuntime = BotRuntime<SimulatedSearch, ConsoleSink>;

/// Send `text`, logging instead of failing when the transport refuses it
async fn deliver<M: MessageSink + ?Sized>(sink: &M, chat_id: ChatId, text: &str) {
    if let Err(e) = sink.send(chat_id, text).await {
        tracing::warn!(chat_id = %chat_id, error = %e, "Failed to deliver message");
    }
}
