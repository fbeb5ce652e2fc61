//! Bot runtime executor

use super::deliver;
use super::orchestrator::{SearchLaunch, SearchOrchestrator};
use super::traits::{MessageSink, VehicleSearch};
use crate::search::CityId;
use crate::session::BotState;
use crate::state_machine::{transition, DialogueState, Effect, InboundMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Generic runtime that can work with any search backend and transport
pub struct BotRuntime<V, M>
where
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    state: Arc<Mutex<BotState>>,
    sink: Arc<M>,
    orchestrator: SearchOrchestrator<V, M>,
}

impl<V, M> BotRuntime<V, M>
where
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    pub fn new(search: V, sink: M, city: CityId, cancel_grace: Duration) -> Self {
        let state = Arc::new(Mutex::new(BotState::new()));
        let sink = Arc::new(sink);
        let orchestrator = SearchOrchestrator::new(
            Arc::clone(&state),
            Arc::new(search),
            Arc::clone(&sink),
            city,
            cancel_grace,
        );
        Self {
            state,
            sink,
            orchestrator,
        }
    }

    /// Run one inbound message through the dialogue.
    ///
    /// The transition, the session write-back and any search registration or
    /// cancellation happen under the lock; the reply is sent and the search
    /// started after it is released.
    pub async fn handle_message(&self, message: InboundMessage) {
        let InboundMessage {
            user_id,
            chat_id,
            payload,
        } = message;

        tracing::debug!(user_id = %user_id, chat_id = %chat_id, ?payload, "Message received");

        let (reply, launch) = {
            let mut state = self.state.lock().await;
            let session = state.sessions.get_or_create(user_id, chat_id);
            let result = transition(&session, &payload);

            if result.session.state != session.state {
                tracing::debug!(
                    user_id = %user_id,
                    from = %session.state,
                    to = %result.session.state,
                    "Dialogue transition"
                );
            }

            let mut launch = None;
            for effect in result.effects {
                match effect {
                    Effect::CancelSearch => {
                        if let Some(search_id) = state.searches.cancel(user_id) {
                            tracing::info!(
                                user_id = %user_id,
                                search_id = %search_id,
                                "Search cancelled by new dialogue"
                            );
                        }
                    }
                    Effect::LaunchSearch(request) => {
                        let (search_id, cancel) = state.searches.register(user_id);
                        launch = Some(SearchLaunch {
                            user_id,
                            chat_id,
                            search_id,
                            cancel,
                            request,
                        });
                    }
                }
            }

            state.sessions.update(result.session);
            (result.reply, launch)
        };

        deliver(&*self.sink, chat_id, &reply).await;

        if let Some(launch) = launch {
            self.orchestrator.start(launch).await;
        }
    }

    /// Snapshot of a user's session
    #[cfg(test)]
    pub async fn session(
        &self,
        user_id: crate::state_machine::UserId,
    ) -> Option<crate::state_machine::Session> {
        self.state.lock().await.sessions.get(user_id).cloned()
    }

    #[cfg(test)]
    pub async fn has_active_search(&self, user_id: crate::state_machine::UserId) -> bool {
        self.state.lock().await.searches.is_active(user_id)
    }

    /// Cancel every in-flight search and wait for their supervisors to wind down.
    /// Affected dialogues end in `EndSearch`. Returns how many searches were cancelled.
    pub async fn shutdown(&self) -> usize {
        let cancelled = {
            let mut state = self.state.lock().await;
            let cancelled = state.searches.cancel_all();
            for (user_id, _) in &cancelled {
                if let Some(session) = state.sessions.get_mut(*user_id) {
                    session.state = DialogueState::EndSearch;
                }
            }
            cancelled
        };

        let count = cancelled.len();
        if count > 0 {
            tracing::info!(count, "Cancelling in-flight searches");
        }
        let tasks = cancelled.into_iter().filter_map(|(_, task)| task);
        for joined in futures::future::join_all(tasks).await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Search supervisor did not shut down cleanly");
            }
        }
        count
    }

    #[cfg(test)]
    pub(crate) fn shared_state(&self) -> Arc<Mutex<BotState>> {
        Arc::clone(&self.state)
    }
}
