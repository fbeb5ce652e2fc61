//! Dialogue state and per-user session types

use crate::search::{Coordinate, RentalWindow, SearchRequest};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fmt;

// ============================================================================
// Identities
// ============================================================================

/// Stable identity of a chat participant; key of every per-user map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination address for outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Dialogue State
// ============================================================================

/// Stage of the conversation; decides how the next message is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogueState {
    #[default]
    NotSearching,
    AskingType,
    AskingMargin,
    AskingPosition,
    AskingDateStart,
    AskingDateEnd,
    AskingVehicleType,
    Searching,
    EndSearch,
}

impl DialogueState {
    pub fn as_str(self) -> &'static str {
        match self {
            DialogueState::NotSearching => "not_searching",
            DialogueState::AskingType => "asking_type",
            DialogueState::AskingMargin => "asking_margin",
            DialogueState::AskingPosition => "asking_position",
            DialogueState::AskingDateStart => "asking_date_start",
            DialogueState::AskingDateEnd => "asking_date_end",
            DialogueState::AskingVehicleType => "asking_vehicle_type",
            DialogueState::Searching => "searching",
            DialogueState::EndSearch => "end_search",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Search Parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Flex,
    Station,
}

impl SearchKind {
    /// Case-insensitive match on "flex" / "station"
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("flex") {
            Some(SearchKind::Flex)
        } else if text.eq_ignore_ascii_case("station") {
            Some(SearchKind::Station)
        } else {
            None
        }
    }
}

/// Vehicle category filter for station searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VehicleClass {
    #[default]
    AllTypes,
    FamilyCar,
    UtilityVehicle,
    MidSize,
    Minivan,
}

impl VehicleClass {
    /// Menu order; position in this array is the selection code
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::AllTypes,
        VehicleClass::FamilyCar,
        VehicleClass::UtilityVehicle,
        VehicleClass::MidSize,
        VehicleClass::Minivan,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(VehicleClass::AllTypes),
            "1" => Some(VehicleClass::FamilyCar),
            "2" => Some(VehicleClass::UtilityVehicle),
            "3" => Some(VehicleClass::MidSize),
            "4" => Some(VehicleClass::Minivan),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            VehicleClass::AllTypes => '0',
            VehicleClass::FamilyCar => '1',
            VehicleClass::UtilityVehicle => '2',
            VehicleClass::MidSize => '3',
            VehicleClass::Minivan => '4',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleClass::AllTypes => "All types",
            VehicleClass::FamilyCar => "Family car",
            VehicleClass::UtilityVehicle => "Utility vehicle",
            VehicleClass::MidSize => "Mid-size",
            VehicleClass::Minivan => "Minivan",
        }
    }
}

/// Parameters collected so far in the current search cycle.
///
/// A field stays `None` until the dialogue has validated and set it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchParams {
    pub kind: Option<SearchKind>,
    pub radius_km: Option<f64>,
    pub coordinate: Option<Coordinate>,
    pub rental_start: Option<NaiveDateTime>,
    pub rental_end: Option<NaiveDateTime>,
    pub vehicle_class: Option<VehicleClass>,
}

impl SearchParams {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        *self == SearchParams::default()
    }

    /// Build the request once everything its kind needs is present
    pub fn to_request(&self) -> Option<SearchRequest> {
        let coordinate = self.coordinate?;
        let radius_km = self.radius_km?;
        match self.kind? {
            SearchKind::Flex => Some(SearchRequest::Flex {
                coordinate,
                radius_km,
            }),
            SearchKind::Station => Some(SearchRequest::Station {
                coordinate,
                radius_km,
                window: RentalWindow {
                    start: self.rental_start?,
                    end: self.rental_end?,
                },
                vehicle_class: self.vehicle_class?,
            }),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Dialogue progress and collected parameters of one user
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub state: DialogueState,
    pub params: SearchParams,
}

impl Session {
    pub fn new(user_id: UserId, chat_id: ChatId) -> Self {
        Self {
            user_id,
            chat_id,
            state: DialogueState::NotSearching,
            params: SearchParams::default(),
        }
    }

    pub fn reset_search(&mut self) {
        self.params = SearchParams::default();
    }

    pub fn search_request(&self) -> Option<SearchRequest> {
        self.params.to_request()
    }
}
