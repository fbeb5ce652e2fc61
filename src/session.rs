//! Per-user session storage and active-search bookkeeping
//!
//! Both halves live in one [`BotState`] behind a single lock so a message
//! transaction (read session, transition, write back, register or cancel a
//! search) is atomic with respect to background search completion.

mod registry;
mod store;

pub use registry::SearchRegistry;
pub use store::SessionStore;

/// Everything guarded by the runtime lock
#[derive(Debug, Default)]
pub struct BotState {
    pub sessions: SessionStore,
    pub searches: SearchRegistry,
}

impl BotState {
    pub fn new() -> Self {
        Self {
            sessions: SessionStore::new(),
            searches: SearchRegistry::new(),
        }
    }

    /// A user has an active search exactly when their dialogue is `Searching`
    #[cfg(test)]
    pub fn search_matches_dialogue(&self, user_id: crate::state_machine::UserId) -> bool {
        let searching = self
            .sessions
            .get(user_id)
            .is_some_and(|s| s.state == crate::state_machine::DialogueState::Searching);
        searching == self.searches.is_active(user_id)
    }
}
