//! Process configuration from environment variables

use crate::search::CityId;
use crate::state_machine::{ChatId, UserId};
use std::time::Duration;
use thiserror::Error;

/// City searched when `FINDER_CITY_ID` is unset (Montréal)
pub const DEFAULT_CITY: CityId = CityId(59);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Bot configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub city: CityId,
    /// How long a cancelled search may keep running before it is aborted
    pub cancel_grace: Duration,
    pub simulated_delay: Duration,
    /// Count reported by the simulated backend; negative reports failure
    pub simulated_vehicles: i32,
    /// Identity given to plain-text console lines
    pub default_user: UserId,
    pub default_chat: ChatId,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY,
            cancel_grace: Duration::from_millis(5000),
            simulated_delay: Duration::from_millis(2000),
            simulated_vehicles: 1,
            default_user: UserId(1),
            default_chat: ChatId(1),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let city = parse_or(&lookup, "FINDER_CITY_ID", defaults.city.0)?;
        let grace_ms = parse_or(&lookup, "FINDER_CANCEL_GRACE_MS", millis(defaults.cancel_grace))?;
        let delay_ms = parse_or(&lookup, "FINDER_SIM_DELAY_MS", millis(defaults.simulated_delay))?;
        let vehicles = parse_or(&lookup, "FINDER_SIM_VEHICLES", defaults.simulated_vehicles)?;
        let user = parse_or(&lookup, "FINDER_USER_ID", defaults.default_user.0)?;
        let chat = parse_or(&lookup, "FINDER_CHAT_ID", defaults.default_chat.0)?;

        Ok(Self {
            city: CityId(city),
            cancel_grace: Duration::from_millis(grace_ms),
            simulated_delay: Duration::from_millis(delay_ms),
            simulated_vehicles: vehicles,
            default_user: UserId(user),
            default_chat: ChatId(chat),
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
