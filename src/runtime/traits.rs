//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::search::{CityId, Coordinate, RentalWindow, ResultConduit};
use crate::state_machine::state::{ChatId, VehicleClass};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// External vehicle search.
///
/// Implementations must write exactly one value to `conduit` (consuming it)
/// or drop it, and should stop early once `cancel` fires.
#[async_trait]
pub trait VehicleSearch: Send + Sync {
    /// Free-floating vehicles near `coordinate`
    async fn search_flex(
        &self,
        city: CityId,
        coordinate: Coordinate,
        radius_km: f64,
        conduit: ResultConduit,
        cancel: CancellationToken,
    );

    /// Station vehicles near `coordinate` available for the whole `window`
    #[allow(clippy::too_many_arguments)]
    async fn search_station(
        &self,
        city: CityId,
        coordinate: Coordinate,
        radius_km: f64,
        window: RentalWindow,
        vehicle_class: VehicleClass,
        conduit: ResultConduit,
        cancel: CancellationToken,
    );
}

/// Outbound message delivery
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), SendError>;
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("transport closed")]
    Closed,
    #[error("failed to deliver message: {0}")]
    Delivery(#[from] std::io::Error),
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: VehicleSearch + ?Sized> VehicleSearch for Arc<T> {
    async fn search_flex(
        &self,
        city: CityId,
        coordinate: Coordinate,
        radius_km: f64,
        conduit: ResultConduit,
        cancel: CancellationToken,
    ) {
        (**self)
            .search_flex(city, coordinate, radius_km, conduit, cancel)
            .await;
    }

    async fn search_station(
        &self,
        city: CityId,
        coordinate: Coordinate,
        radius_km: f64,
        window: RentalWindow,
        vehicle_class: VehicleClass,
        conduit: ResultConduit,
        cancel: CancellationToken,
    ) {
        (**self)
            .search_station(city, coordinate, radius_km, window, vehicle_class, conduit, cancel)
            .await;
    }
}

#[async_trait]
impl<T: MessageSink + ?Sized> MessageSink for Arc<T> {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        (**self).send(chat_id, text).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Stand-in for the third-party availability service.
///
/// Waits `delay`, then reports `vehicles` (a negative value reports failure).
/// Cancellation is honored immediately.
#[derive(Debug, Clone)]
pub struct SimulatedSearch {
    delay: Duration,
    vehicles: i32,
}

impl SimulatedSearch {
    pub fn new(delay: Duration, vehicles: i32) -> Self {
        Self { delay, vehicles }
    }

    async fn run(&self, conduit: ResultConduit, cancel: CancellationToken) {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                tracing::debug!("Simulated search cancelled");
                conduit.failed();
            }

            () = tokio::time::sleep(self.delay) => {
                conduit.send(self.vehicles);
            }
        }
    }
}

#[async_trait]
impl VehicleSearch for SimulatedSearch {
    async fn search_flex(
        &self,
        city: CityId,
        coordinate: Coordinate,
        radius_km: f64,
        conduit: ResultConduit,
        cancel: CancellationToken,
    ) {
        tracing::debug!(city = %city, %coordinate, radius_km, "Simulating flex search");
        self.run(conduit, cancel).await;
    }

    async fn search_station(
        &self,
        city: CityId,
        coordinate: Coordinate,
        radius_km: f64,
        window: RentalWindow,
        vehicle_class: VehicleClass,
        conduit: ResultConduit,
        cancel: CancellationToken,
    ) {
        tracing::debug!(
            city = %city,
            %coordinate,
            radius_km,
            start = %window.start,
            end = %window.end,
            vehicle_class = vehicle_class.label(),
            "Simulating station search"
        );
        self.run(conduit, cancel).await;
    }
}
