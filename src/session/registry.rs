//! Registry of in-flight searches, at most one per user

use crate::search::SearchId;
use crate::state_machine::UserId;
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle on a user's in-flight search.
///
/// Owns the cancellation token shared with the search and, once attached, the
/// supervising task. Dropping the handle detaches the task without stopping it;
/// use [`ActiveSearch::cancel`] to stop it.
#[derive(Debug)]
pub struct ActiveSearch {
    pub id: SearchId,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ActiveSearch {
    pub fn new(id: SearchId, cancel: CancellationToken) -> Self {
        Self {
            id,
            cancel,
            task: None,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation; returns the supervising task so the caller may await it
    pub fn cancel(mut self) -> Option<JoinHandle<()>> {
        self.cancel.cancel();
        self.task.take()
    }
}

#[derive(Debug, Default)]
pub struct SearchRegistry {
    active: HashMap<UserId, ActiveSearch>,
}

impl SearchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh search for `user_id`, cancelling any stale one first
    pub fn register(&mut self, user_id: UserId) -> (SearchId, CancellationToken) {
        if let Some(stale) = self.active.remove(&user_id) {
            tracing::warn!(user_id = %user_id, search_id = %stale.id, "Replacing stale search");
            let _ = stale.cancel();
        }
        let search = ActiveSearch::new(SearchId::new(), CancellationToken::new());
        let registered = (search.id, search.cancel_token());
        self.active.insert(user_id, search);
        registered
    }

    /// Hand the supervising task to the registry.
    ///
    /// Returns the task back if `id` is no longer the user's current search.
    pub fn attach_task(
        &mut self,
        user_id: UserId,
        id: SearchId,
        task: JoinHandle<()>,
    ) -> Result<(), JoinHandle<()>> {
        match self.active.get_mut(&user_id) {
            Some(search) if search.id == id => {
                search.task = Some(task);
                Ok(())
            }
            _ => Err(task),
        }
    }

    /// Cancel and forget the user's search
    pub fn cancel(&mut self, user_id: UserId) -> Option<SearchId> {
        let search = self.active.remove(&user_id)?;
        let id = search.id;
        let _ = search.cancel();
        Some(id)
    }

    /// Deregister `id` after it completed. Returns false when the search was
    /// already cancelled or replaced, in which case its result must be discarded.
    pub fn finish(&mut self, user_id: UserId, id: SearchId) -> bool {
        match self.active.get(&user_id) {
            Some(search) if search.id == id => {
                self.active.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// Cancel every search; returns the affected users and their supervising tasks
    pub fn cancel_all(&mut self) -> Vec<(UserId, Option<JoinHandle<()>>)> {
        self.active
            .drain()
            .map(|(user_id, search)| (user_id, search.cancel()))
            .collect()
    }

    #[cfg(test)]
    pub fn is_active(&self, user_id: UserId) -> bool {
        self.active.contains_key(&user_id)
    }

    #[cfg(test)]
    pub fn active_id(&self, user_id: UserId) -> Option<SearchId> {
        self.active.get(&user_id).map(|s| s.id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.len()
    }
}
