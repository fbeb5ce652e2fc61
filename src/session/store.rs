//! Session store

use crate::state_machine::{ChatId, Session, UserId};
use std::collections::HashMap;

/// One session per user, kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session of `user_id`, creating a blank one on first contact.
    /// `chat_id` is refreshed from the latest inbound message.
    pub fn get_or_create(&mut self, user_id: UserId, chat_id: ChatId) -> Session {
        let session = self
            .sessions
            .entry(user_id)
            .or_insert_with(|| Session::new(user_id, chat_id));
        session.chat_id = chat_id;
        session.clone()
    }

    #[cfg(test)]
    pub fn get(&self, user_id: UserId) -> Option<&Session> {
        self.sessions.get(&user_id)
    }

    pub fn get_mut(&mut self, user_id: UserId) -> Option<&mut Session> {
        self.sessions.get_mut(&user_id)
    }

    /// Replace the stored record with `session`
    pub fn update(&mut self, session: Session) {
        self.sessions.insert(session.user_id, session);
    }

    /// Forget `user_id`; a later message starts a blank session
    #[allow(dead_code)] // Sessions currently live for the whole process
    pub fn remove(&mut self, user_id: UserId) -> Option<Session> {
        self.sessions.remove(&user_id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
