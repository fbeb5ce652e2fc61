//! Contract types shared with the external vehicle search
//!
//! The search itself (geocoding, distance filtering, availability lookup) lives
//! behind [`crate::runtime::VehicleSearch`]. This module only defines what goes
//! in (a [`SearchRequest`]) and what comes back (one integer on a
//! [`ResultConduit`]).

use crate::state_machine::state::VehicleClass;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fmt;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Raw value written to the conduit when a search fails or is cancelled.
pub const SEARCH_FAILED: i32 = -1;

/// Identifier of the city the search service operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CityId(pub u32);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GPS position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPS({:.6},{:.6})", self.latitude, self.longitude)
    }
}

/// Rental period of a station search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Fully validated parameters of one search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    /// Free-floating vehicle available right now
    Flex {
        coordinate: Coordinate,
        radius_km: f64,
    },
    /// Reservable station vehicle for a rental window
    Station {
        coordinate: Coordinate,
        radius_km: f64,
        window: RentalWindow,
        vehicle_class: VehicleClass,
    },
}

impl SearchRequest {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SearchRequest::Flex { .. } => "flex",
            SearchRequest::Station { .. } => "station",
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        match self {
            SearchRequest::Flex { coordinate, .. } | SearchRequest::Station { coordinate, .. } => {
                *coordinate
            }
        }
    }

    pub fn radius_km(&self) -> f64 {
        match self {
            SearchRequest::Flex { radius_km, .. } | SearchRequest::Station { radius_km, .. } => {
                *radius_km
            }
        }
    }
}

/// Identity of one launched search, used to tell a live search from a superseded one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchId(Uuid);

impl SearchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SearchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the orchestrator makes of the raw conduit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(u32),
    Failed,
}

impl SearchOutcome {
    /// Negative values are the failure sentinel.
    pub fn from_raw(raw: i32) -> Self {
        u32::try_from(raw).map_or(SearchOutcome::Failed, SearchOutcome::Found)
    }

    /// A conduit dropped without a value counts as a failure.
    pub fn from_received(received: Result<i32, oneshot::error::RecvError>) -> Self {
        received.map_or(SearchOutcome::Failed, Self::from_raw)
    }
}

/// Single-slot channel the search writes its result into.
///
/// Sending consumes the conduit, so a search can report at most once. If the
/// search drops it without sending, the waiting side observes a failure.
#[derive(Debug)]
pub struct ResultConduit {
    tx: oneshot::Sender<i32>,
}

impl ResultConduit {
    pub fn channel() -> (Self, oneshot::Receiver<i32>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Write the raw integer result. The receiver may already be gone, which is fine.
    pub fn send(self, raw: i32) {
        let _ = self.tx.send(raw);
    }

    pub fn failed(self) {
        self.send(SEARCH_FAILED);
    }
}
