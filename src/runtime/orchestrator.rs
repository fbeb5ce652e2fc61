//! Search orchestration
//!
//! Each launch spawns two tasks: the external search, and a supervisor that
//! waits on the result conduit, moves the dialogue to `EndSearch` and sends the
//! result. The supervisor handle is owned by the user's entry in the
//! [`SearchRegistry`].
//!
//! [`SearchRegistry`]: crate::session::SearchRegistry

use super::deliver;
use super::traits::{MessageSink, VehicleSearch};
use crate::search::{CityId, ResultConduit, SearchId, SearchOutcome, SearchRequest};
use crate::session::BotState;
use crate::state_machine::replies;
use crate::state_machine::{ChatId, DialogueState, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A search registered under the lock, ready to be started once it is released
#[derive(Debug)]
pub struct SearchLaunch {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub search_id: SearchId,
    pub cancel: CancellationToken,
    pub request: SearchRequest,
}

pub struct SearchOrchestrator<V, M>
where
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    state: Arc<Mutex<BotState>>,
    search: Arc<V>,
    sink: Arc<M>,
    city: CityId,
    /// How long a cancelled search may take to acknowledge before it is aborted
    cancel_grace: Duration,
}

impl<V, M> Clone for SearchOrchestrator<V, M>
where
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            search: Arc::clone(&self.search),
            sink: Arc::clone(&self.sink),
            city: self.city,
            cancel_grace: self.cancel_grace,
        }
    }
}

impl<V, M> SearchOrchestrator<V, M>
where
    V: VehicleSearch + 'static,
    M: MessageSink + 'static,
{
    pub fn new(
        state: Arc<Mutex<BotState>>,
        search: Arc<V>,
        sink: Arc<M>,
        city: CityId,
        cancel_grace: Duration,
    ) -> Self {
        Self {
            state,
            search,
            sink,
            city,
            cancel_grace,
        }
    }

    /// Start a registered search. Must be called after the lock is released.
    pub async fn start(&self, launch: SearchLaunch) {
        let SearchLaunch {
            user_id,
            chat_id,
            search_id,
            cancel,
            request,
        } = launch;

        tracing::info!(
            user_id = %user_id,
            search_id = %search_id,
            kind = request.kind_name(),
            radius_km = request.radius_km(),
            "Launching search"
        );

        let (conduit, receiver) = ResultConduit::channel();
        let search_task = tokio::spawn(run_search(
            Arc::clone(&self.search),
            self.city,
            request,
            conduit,
            cancel.clone(),
        ));

        let supervisor = self.clone();
        let task = tokio::spawn(async move {
            supervisor
                .supervise(user_id, chat_id, search_id, cancel, receiver, search_task)
                .await;
        });

        let mut state = self.state.lock().await;
        if state.searches.attach_task(user_id, search_id, task).is_err() {
            tracing::debug!(
                user_id = %user_id,
                search_id = %search_id,
                "Search finished or was replaced before its task was attached"
            );
        }
    }

    async fn supervise(
        self,
        user_id: UserId,
        chat_id: ChatId,
        search_id: SearchId,
        cancel: CancellationToken,
        receiver: oneshot::Receiver<i32>,
        search_task: JoinHandle<()>,
    ) {
        let outcome = self.await_outcome(&cancel, receiver, &search_task).await;

        // Deregister and close the dialogue in one critical section so the
        // handle disappears exactly when the state leaves `Searching`.
        let reply_to = {
            let mut state = self.state.lock().await;
            if state.searches.finish(user_id, search_id) {
                state.sessions.get_mut(user_id).map_or(Some(chat_id), |session| {
                    session.state = DialogueState::EndSearch;
                    Some(session.chat_id)
                })
            } else {
                None
            }
        };

        let Some(reply_to) = reply_to else {
            tracing::info!(
                user_id = %user_id,
                search_id = %search_id,
                ?outcome,
                "Discarding result of cancelled search"
            );
            return;
        };

        tracing::info!(user_id = %user_id, search_id = %search_id, ?outcome, "Search finished");
        deliver(&*self.sink, reply_to, &replies::search_result(outcome)).await;
    }

    /// Wait for the conduit. Once cancellation is requested the search gets
    /// `cancel_grace` to report before it is aborted and counted as failed.
    async fn await_outcome(
        &self,
        cancel: &CancellationToken,
        receiver: oneshot::Receiver<i32>,
        search_task: &JoinHandle<()>,
    ) -> SearchOutcome {
        let grace = self.cancel_grace;
        tokio::select! {
            received = receiver => SearchOutcome::from_received(received),

            () = async {
                cancel.cancelled().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(
                    grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                    "Search ignored cancellation, aborting it"
                );
                search_task.abort();
                SearchOutcome::Failed
            }
        }
    }
}

async fn run_search<V: VehicleSearch + ?Sized>(
    search: Arc<V>,
    city: CityId,
    request: SearchRequest,
    conduit: ResultConduit,
    cancel: CancellationToken,
) {
    match request {
        SearchRequest::Flex {
            coordinate,
            radius_km,
        } => {
            search
                .search_flex(city, coordinate, radius_km, conduit, cancel)
                .await;
        }
        SearchRequest::Station {
            coordinate,
            radius_km,
            window,
            vehicle_class,
        } => {
            search
                .search_station(
                    city,
                    coordinate,
                    radius_km,
                    window,
                    vehicle_class,
                    conduit,
                    cancel,
                )
                .await;
        }
    }
}
