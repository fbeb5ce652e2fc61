//! Validation of free-text answers

use super::state::VehicleClass;
use chrono::NaiveDateTime;
use thiserror::Error;

/// chrono layout of every date-time exchanged with the user
pub const DATE_LAYOUT: &str = "%Y-%m-%d %H:%M";

/// The same layout as shown to users
pub const DATE_LAYOUT_HINT: &str = "YYYY-MM-DD HH:MM";

/// Why a free-text answer was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("radius {0:?} is not a number")]
    RadiusNotNumeric(String),
    #[error("radius must be greater than zero, got {0}")]
    RadiusNotPositive(f64),
    #[error("{0:?} does not match the layout {DATE_LAYOUT_HINT}")]
    DateLayout(String),
    #[error("rental end {end} is not after rental start {start}")]
    EndNotAfterStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("unknown vehicle type code {0:?}")]
    VehicleClass(String),
}

pub fn parse_radius(text: &str) -> Result<f64, InputError> {
    let text = text.trim();
    let radius: f64 = text
        .parse()
        .map_err(|_| InputError::RadiusNotNumeric(text.to_string()))?;
    if !radius.is_finite() {
        return Err(InputError::RadiusNotNumeric(text.to_string()));
    }
    if radius <= 0.0 {
        return Err(InputError::RadiusNotPositive(radius));
    }
    Ok(radius)
}

/// Parse a date-time written exactly in [`DATE_LAYOUT`], zero-padded fields included
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime, InputError> {
    let text = text.trim();
    let layout_error = || InputError::DateLayout(text.to_string());
    let parsed = NaiveDateTime::parse_from_str(text, DATE_LAYOUT).map_err(|_| layout_error())?;
    // chrono accepts unpadded fields such as "2024-1-1 9:5"
    if format_date_time(parsed) != text {
        return Err(layout_error());
    }
    Ok(parsed)
}

/// Parse the rental end and check it comes after `start`
pub fn parse_rental_end(text: &str, start: NaiveDateTime) -> Result<NaiveDateTime, InputError> {
    let end = parse_date_time(text)?;
    if end <= start {
        return Err(InputError::EndNotAfterStart { start, end });
    }
    Ok(end)
}

pub fn parse_vehicle_class(text: &str) -> Result<VehicleClass, InputError> {
    VehicleClass::from_code(text).ok_or_else(|| InputError::VehicleClass(text.trim().to_string()))
}

pub fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_LAYOUT).to_string()
}

/// Radius with at most two decimals and no trailing zeros ("3", "1.5").
/// Radii too small for two decimals are shown in full.
pub fn format_radius(radius_km: f64) -> String {
    let rounded = format!("{radius_km:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "0" {
        return radius_km.to_string();
    }
    trimmed.to_string()
}
