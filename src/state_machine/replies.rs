//! Outbound message texts

use super::input::{format_date_time, format_radius, DATE_LAYOUT_HINT};
use super::state::VehicleClass;
use crate::search::{SearchOutcome, SearchRequest};
use std::fmt::Write;

pub const HELP: &str = "Type:\n\
    /start to initiate a new search\n\
    /restart to restart a search with the same parameters as the previous search";

pub const GREETING: &str = "Hello! Type:\n\
    - station to search for a station vehicle\n\
    - flex to search for a flex vehicle";

pub const ASK_RADIUS: &str = "What is your search radius in km?";

pub const INVALID_RADIUS: &str = "Please enter a correct search radius";

pub const ASK_POSITION: &str = "Please share the GPS location for your search";

pub const INVALID_VEHICLE_CLASS: &str = "Please select one valid vehicle type";

pub const RESTART_WITHOUT_SEARCH: &str = "Please initiate a new search before restarting it.";

pub const NOT_UNDERSTOOD: &str = "I didn't quite understand.";

pub fn ask_rental_start() -> String {
    format!("What is the start date and time for the rental in the format {DATE_LAYOUT_HINT}?")
}

pub fn ask_rental_end() -> String {
    format!("What is the end date and time for the rental in the format {DATE_LAYOUT_HINT}?")
}

pub fn invalid_date_time() -> String {
    format!("Please enter a valid date and time in the format {DATE_LAYOUT_HINT}")
}

pub fn end_not_after_start(start: chrono::NaiveDateTime) -> String {
    format!(
        "The end of the rental must be after its start ({}). Please enter another end date and time.",
        format_date_time(start)
    )
}

pub fn vehicle_class_menu() -> String {
    let mut menu = String::from("Which type of vehicle are you looking for?");
    for class in VehicleClass::ALL {
        let _ = write!(menu, "\n{} - {}", class.code(), class.label());
    }
    menu
}

/// Acknowledgement sent when a search starts
pub fn search_started(request: &SearchRequest) -> String {
    let mut message = format!(
        "Searching for a {} vehicle within {}km of {}",
        request.kind_name(),
        format_radius(request.radius_km()),
        request.coordinate()
    );
    if let SearchRequest::Station {
        window,
        vehicle_class,
        ..
    } = request
    {
        let _ = write!(
            message,
            " from {} to {} (vehicle type: {})",
            format_date_time(window.start),
            format_date_time(window.end),
            vehicle_class.label()
        );
    }
    message
}

/// Terminal message once the search has reported
pub fn search_result(outcome: SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Found(vehicles) => {
            format!("Found! {vehicles} vehicle(s) available according to your search criteria")
        }
        SearchOutcome::Failed => "An error occurred during the search, no vehicle could be found. \
            Type /restart to search again with the same parameters."
            .to_string(),
    }
}
