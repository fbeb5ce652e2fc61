//! Vehicle Finder Bot - conversational front-end for vehicle availability searches
//!
//! A per-user dialogue state machine collects search criteria from chat
//! messages and supervises one cancellable search per user.

mod config;
mod runtime;
mod search;
mod session;
mod state_machine;
mod transport;

use config::BotConfig;
use runtime::{ProductionRuntime, SimulatedSearch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{run_console, ConsoleSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the console transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vehicle_finder_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(
        city = %config.city,
        cancel_grace_ms = u64::try_from(config.cancel_grace.as_millis()).unwrap_or(u64::MAX),
        "Vehicle finder bot starting"
    );

    let runtime: ProductionRuntime = ProductionRuntime::new(
        SimulatedSearch::new(config.simulated_delay, config.simulated_vehicles),
        ConsoleSink::new(),
        config.city,
        config.cancel_grace,
    );

    let result = run_console(&runtime, config.default_user, config.default_chat).await;

    let cancelled = runtime.shutdown().await;
    tracing::info!(cancelled, "Vehicle finder bot stopped");

    result?;
    Ok(())
}
