//! Notice bus for async order/inventory messaging.
//!
//! This module contains:
//! - `NoticeBus` trait: notice delivery between services
//! - `NoticeHandler` trait: for processing inbound notices
//! - Bus configuration types
//! - Implementations: Kafka, in-process channel, mock

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Deserialize;
#[cfg(any(feature = "channel", feature = "kafka"))]
use tokio::sync::RwLock;
#[cfg(any(feature = "channel", feature = "kafka"))]
use tracing::{error, info};

use crate::messages::Notice;

// Implementation modules
#[cfg(feature = "channel")]
pub mod channel;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod mock;

// Re-exports
#[cfg(feature = "channel")]
pub use channel::{ChannelConfig, ChannelNoticeBus};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaNoticeBus, KafkaNoticeBusConfig};
pub use mock::MockNoticeBus;

// ============================================================================
// Traits
// ============================================================================

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors that can occur during bus operations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Subscribe not supported for this bus type")]
    SubscribeNotSupported,
}

/// Handler for processing notices from the bus.
pub trait NoticeHandler: Send + Sync {
    /// Process one inbound notice.
    fn handle(&self, notice: Notice) -> BoxFuture<'static, std::result::Result<(), BusError>>;
}

/// Interface for notice delivery between services.
///
/// Publishing routes by notice kind: order-completed notices go to the
/// orders topic, outcome notices to the inventory topic. Consuming reads
/// the orders topic only; this service is the sole producer of inventory
/// outcomes.
#[async_trait]
pub trait NoticeBus: Send + Sync {
    /// Publish a notice to the topic for its kind.
    async fn publish(&self, notice: &Notice) -> Result<()>;

    /// Subscribe a handler to inbound order notices.
    ///
    /// The handler is called once per notice received.
    async fn subscribe(&self, handler: Box<dyn NoticeHandler>) -> Result<()>;

    /// Start consuming notices (call after subscribe).
    async fn start_consuming(&self) -> Result<()>;
}

/// Run all subscribed handlers against one notice, logging failures.
///
/// A failed handler never stops delivery to the others, and never causes
/// redelivery; processing a notice is attempted exactly once.
#[cfg(any(feature = "channel", feature = "kafka"))]
pub(crate) async fn dispatch_to_handlers(
    handlers: &RwLock<Vec<Box<dyn NoticeHandler>>>,
    notice: &Notice,
) {
    let handlers_guard = handlers.read().await;
    for handler in handlers_guard.iter() {
        if let Err(e) = handler.handle(notice.clone()).await {
            error!(error = %e, "Handler failed");
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Messaging type discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagingType {
    /// In-process channel messaging.
    #[default]
    Channel,
    /// Kafka messaging.
    Kafka,
}

/// Messaging configuration (discriminated union).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Messaging type discriminator.
    #[serde(rename = "type")]
    pub messaging_type: MessagingType,
    /// Topic carrying order-completed notices.
    pub orders_topic: String,
    /// Topic carrying inventory outcome notices.
    pub inventory_topic: String,
    /// Kafka-specific configuration.
    pub kafka: KafkaConfig,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            messaging_type: MessagingType::Channel,
            orders_topic: "orders".to_string(),
            inventory_topic: "inventory".to_string(),
            kafka: KafkaConfig::default(),
        }
    }
}

/// Kafka-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Kafka bootstrap servers (comma-separated).
    pub bootstrap_servers: String,
    /// Consumer group ID.
    pub group_id: String,
    /// SASL username (optional, for authenticated clusters).
    pub sasl_username: Option<String>,
    /// SASL password (optional, for authenticated clusters).
    pub sasl_password: Option<String>,
    /// SASL mechanism (PLAIN, SCRAM-SHA-256, SCRAM-SHA-512).
    pub sasl_mechanism: Option<String>,
    /// Security protocol (PLAINTEXT, SSL, SASL_PLAINTEXT, SASL_SSL).
    pub security_protocol: Option<String>,
    /// SSL CA certificate path (for SSL connections).
    pub ssl_ca_location: Option<String>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            group_id: "stockroom".to_string(),
            sasl_username: None,
            sasl_password: None,
            sasl_mechanism: None,
            security_protocol: None,
            ssl_ca_location: None,
        }
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Initialize the notice bus based on configuration.
///
/// Returns the appropriate NoticeBus implementation based on messaging_type.
/// Requires the corresponding feature to be enabled:
/// - Channel: `--features channel` (included in default)
/// - Kafka: `--features kafka`
pub async fn init_notice_bus(
    config: &MessagingConfig,
) -> std::result::Result<Arc<dyn NoticeBus>, Box<dyn std::error::Error + Send + Sync>> {
    match config.messaging_type {
        MessagingType::Channel => {
            #[cfg(feature = "channel")]
            {
                let bus = ChannelNoticeBus::new(ChannelConfig::new(
                    &config.orders_topic,
                    &config.inventory_topic,
                ));
                info!(messaging_type = "channel", "Notice bus initialized");
                Ok(Arc::new(bus))
            }

            #[cfg(not(feature = "channel"))]
            {
                Err(
                    "Channel support requires the 'channel' feature. Rebuild with --features channel"
                        .into(),
                )
            }
        }
        MessagingType::Kafka => {
            #[cfg(feature = "kafka")]
            {
                let mut kafka_config = KafkaNoticeBusConfig::subscriber(
                    &config.kafka.bootstrap_servers,
                    &config.kafka.group_id,
                )
                .with_topics(&config.orders_topic, &config.inventory_topic);
                kafka_config.sasl_username = config.kafka.sasl_username.clone();
                kafka_config.sasl_password = config.kafka.sasl_password.clone();
                kafka_config.sasl_mechanism = config.kafka.sasl_mechanism.clone();
                kafka_config.security_protocol = config.kafka.security_protocol.clone();
                kafka_config.ssl_ca_location = config.kafka.ssl_ca_location.clone();

                let bus = KafkaNoticeBus::new(kafka_config).await?;
                info!(messaging_type = "kafka", "Notice bus initialized");
                Ok(Arc::new(bus))
            }

            #[cfg(not(feature = "kafka"))]
            {
                Err("Kafka support requires the 'kafka' feature. Rebuild with --features kafka"
                    .into())
            }
        }
    }
}
