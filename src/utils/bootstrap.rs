//! Bootstrap utilities for the stockroom binary.
//!
//! Shared initialization code: tracing setup and startup connection retry.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the STOCKROOM_LOG environment variable.
///
/// Defaults to "info" level if STOCKROOM_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// First CLI argument as the config file path, if given.
pub fn parse_config_path() -> Option<String> {
    std::env::args().nth(1)
}

/// Connect to a backing service with exponential backoff retry.
///
/// Storage and broker containers routinely come up after the service in
/// local compose setups, so startup blocks here until the dependency is
/// reachable instead of failing fast.
///
/// # Arguments
/// * `service_name` - Human-readable name for logging (e.g., "item store", "notice bus")
/// * `address` - The address being connected to, for logging
/// * `connect` - Async function that attempts to establish a connection
///
/// # Returns
/// The connected client on success, or the last error after max retries.
pub async fn connect_with_retry<T, E, F, Fut>(
    service_name: &str,
    address: &str,
    connect: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    const MAX_RETRIES: u32 = 30;
    const INITIAL_DELAY: Duration = Duration::from_millis(100);
    const MAX_DELAY: Duration = Duration::from_secs(5);

    let mut delay = INITIAL_DELAY;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match connect().await {
            Ok(client) => {
                tracing::info!("Connected to {} at {}", service_name, address);
                return Ok(client);
            }
            Err(e) if attempt < MAX_RETRIES => {
                warn!(
                    "Failed to connect to {} (attempt {}/{}): {}. Retrying in {:?}...",
                    service_name, attempt, MAX_RETRIES, e, delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, MAX_DELAY);
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to {} after {} attempts: {}",
                    service_name,
                    MAX_RETRIES,
                    e
                );
                return Err(e);
            }
        }
    }
}
