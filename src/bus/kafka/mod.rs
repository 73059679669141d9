//! Kafka notice bus implementation.
//!
//! Order-completed notices arrive on the orders topic; outcome notices are
//! produced to the inventory topic. Message key: decimal item id (ensures
//! ordering per item).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::{BusError, NoticeBus, NoticeHandler, Result};
use crate::messages::Notice;

/// Configuration for Kafka connection.
#[derive(Clone, Debug)]
pub struct KafkaNoticeBusConfig {
    /// Kafka bootstrap servers (comma-separated).
    pub bootstrap_servers: String,
    /// Topic carrying order-completed notices.
    pub orders_topic: String,
    /// Topic carrying inventory outcome notices.
    pub inventory_topic: String,
    /// Consumer group ID (required for subscribing).
    pub group_id: Option<String>,
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

impl KafkaNoticeBusConfig {
    /// Create config for publishing only.
    pub fn publisher(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            orders_topic: "orders".to_string(),
            inventory_topic: "inventory".to_string(),
            group_id: None,
            sasl_username: None,
            sasl_password: None,
            sasl_mechanism: None,
            security_protocol: None,
            ssl_ca_location: None,
        }
    }

    /// Create config for consuming order notices (and publishing outcomes).
    pub fn subscriber(
        bootstrap_servers: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Self::publisher(bootstrap_servers)
        }
    }

    /// Set the orders and inventory topic names.
    pub fn with_topics(
        mut self,
        orders_topic: impl Into<String>,
        inventory_topic: impl Into<String>,
    ) -> Self {
        self.orders_topic = orders_topic.into();
        self.inventory_topic = inventory_topic.into();
        self
    }

    /// Add SASL authentication.
    pub fn with_sasl(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        mechanism: impl Into<String>,
    ) -> Self {
        self.sasl_username = Some(username.into());
        self.sasl_password = Some(password.into());
        self.sasl_mechanism = Some(mechanism.into());
        self.security_protocol = Some("SASL_SSL".to_string());
        self
    }

    /// Set security protocol.
    pub fn with_security_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.security_protocol = Some(protocol.into());
        self
    }

    /// Set SSL CA certificate location.
    pub fn with_ssl_ca(mut self, ca_location: impl Into<String>) -> Self {
        self.ssl_ca_location = Some(ca_location.into());
        self
    }

    /// Topic a notice is published to.
    pub fn topic_for(&self, notice: &Notice) -> &str {
        match notice {
            Notice::OrderCompleted { .. } => &self.orders_topic,
            _ => &self.inventory_topic,
        }
    }

    /// Build a ClientConfig for producers.
    fn build_producer_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.bootstrap_servers);
        config.set("message.timeout.ms", "5000");
        config.set("acks", "all");
        config.set("enable.idempotence", "true");

        self.apply_security_config(&mut config);
        config
    }

    /// Build a ClientConfig for consumers.
    fn build_consumer_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.bootstrap_servers);
        config.set("enable.auto.commit", "false");
        config.set("auto.offset.reset", "earliest");

        if let Some(ref group_id) = self.group_id {
            config.set("group.id", group_id);
        }

        self.apply_security_config(&mut config);
        config
    }

    /// Apply security settings to a ClientConfig.
    fn apply_security_config(&self, config: &mut ClientConfig) {
        if let Some(ref protocol) = self.security_protocol {
            config.set("security.protocol", protocol);
        }

        if let Some(ref mechanism) = self.sasl_mechanism {
            config.set("sasl.mechanism", mechanism);
        }

        if let Some(ref username) = self.sasl_username {
            config.set("sasl.username", username);
        }

        if let Some(ref password) = self.sasl_password {
            config.set("sasl.password", password);
        }

        if let Some(ref ca_location) = self.ssl_ca_location {
            config.set("ssl.ca.location", ca_location);
        }
    }
}

/// Kafka notice bus implementation.
///
/// Notices are serialized as JSON envelopes discriminated by `kind`. Message
/// keys are the decimal item id, so notices for one item land on one
/// partition and stay ordered. Consumers use a group for load balancing
/// across instances; offsets are committed only after the handlers ran, so a
/// crash mid-notice redelivers rather than drops.
pub struct KafkaNoticeBus {
    producer: FutureProducer,
    config: KafkaNoticeBusConfig,
    handlers: Arc<RwLock<Vec<Box<dyn NoticeHandler>>>>,
    consumer: Option<Arc<StreamConsumer>>,
}

impl KafkaNoticeBus {
    /// Create a new Kafka notice bus.
    pub async fn new(config: KafkaNoticeBusConfig) -> Result<Self> {
        let producer: FutureProducer = config
            .build_producer_config()
            .create()
            .map_err(|e| BusError::Connection(format!("Failed to create Kafka producer: {}", e)))?;

        info!(
            bootstrap_servers = %config.bootstrap_servers,
            orders_topic = %config.orders_topic,
            inventory_topic = %config.inventory_topic,
            "Connected to Kafka"
        );

        // Create consumer if group_id is configured
        let consumer = if config.group_id.is_some() {
            let consumer: StreamConsumer =
                config.build_consumer_config().create().map_err(|e| {
                    BusError::Connection(format!("Failed to create Kafka consumer: {}", e))
                })?;
            Some(Arc::new(consumer))
        } else {
            None
        };

        Ok(Self {
            producer,
            config,
            handlers: Arc::new(RwLock::new(Vec::new())),
            consumer,
        })
    }
}

#[async_trait]
impl NoticeBus for KafkaNoticeBus {
    async fn publish(&self, notice: &Notice) -> Result<()> {
        let topic = self.config.topic_for(notice);
        let key = notice.item_id().to_string();
        let payload = serde_json::to_vec(notice)
            .map_err(|e| BusError::Publish(format!("Failed to encode notice: {}", e)))?;

        let record = FutureRecord::to(topic).payload(&payload).key(&key);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| BusError::Publish(format!("Failed to publish: {}", e)))?;

        debug!(
            topic = %topic,
            key = %key,
            kind = notice.kind(),
            "Published notice to Kafka"
        );

        Ok(())
    }

    async fn subscribe(&self, handler: Box<dyn NoticeHandler>) -> Result<()> {
        if self.consumer.is_none() {
            return Err(BusError::Subscribe(
                "Cannot subscribe: no consumer configured. Use KafkaNoticeBusConfig::subscriber()"
                    .to_string(),
            ));
        }

        let mut handlers = self.handlers.write().await;
        handlers.push(handler);

        Ok(())
    }

    async fn start_consuming(&self) -> Result<()> {
        let consumer = self
            .consumer
            .as_ref()
            .ok_or_else(|| {
                BusError::Subscribe(
                    "No consumer configured. Use KafkaNoticeBusConfig::subscriber()".to_string(),
                )
            })?
            .clone();

        consumer
            .subscribe(&[self.config.orders_topic.as_str()])
            .map_err(|e| BusError::Subscribe(format!("Failed to subscribe to topic: {}", e)))?;

        info!(topic = %self.config.orders_topic, "Subscribed to Kafka topic");

        let handlers = self.handlers.clone();

        // Spawn consumer task
        tokio::spawn(async move {
            use futures::StreamExt;
            use rdkafka::message::Message as KafkaMessage;

            let mut stream = consumer.stream();

            while let Some(result) = stream.next().await {
                match result {
                    Ok(message) => {
                        match message.payload() {
                            Some(payload) => match serde_json::from_slice::<Notice>(payload) {
                                Ok(notice) => {
                                    debug!(
                                        topic = %message.topic(),
                                        partition = message.partition(),
                                        offset = message.offset(),
                                        kind = notice.kind(),
                                        "Received notice"
                                    );

                                    super::dispatch_to_handlers(&handlers, &notice).await;
                                }
                                Err(e) => {
                                    // Unrecognized payloads are logged and dropped
                                    warn!(error = %e, "Received unrecognized message, dropping");
                                }
                            },
                            None => {
                                warn!("Received message with no payload");
                            }
                        }

                        // Commit either way so dropped messages are not redelivered
                        if let Err(e) = consumer
                            .commit_message(&message, rdkafka::consumer::CommitMode::Async)
                        {
                            error!(error = %e, "Failed to commit offset");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Kafka consumer error");
                    }
                }
            }
        });

        Ok(())
    }
}
