//! In-memory channel-based notice bus for standalone mode.
//!
//! Uses a tokio broadcast channel for pub/sub within a single process.
//! Ideal for local development and testing without a broker.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

use super::{NoticeBus, NoticeHandler, Result};
use crate::messages::Notice;

/// Channel capacity for broadcast.
const CHANNEL_CAPACITY: usize = 1024;

/// Configuration for the channel notice bus.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Topic carrying order-completed notices.
    pub orders_topic: String,
    /// Topic carrying inventory outcome notices.
    pub inventory_topic: String,
}

impl ChannelConfig {
    pub fn new(orders_topic: impl Into<String>, inventory_topic: impl Into<String>) -> Self {
        Self {
            orders_topic: orders_topic.into(),
            inventory_topic: inventory_topic.into(),
        }
    }

    /// Topic a notice is published to.
    pub fn topic_for(&self, notice: &Notice) -> &str {
        match notice {
            Notice::OrderCompleted { .. } => &self.orders_topic,
            _ => &self.inventory_topic,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new("orders", "inventory")
    }
}

/// A notice paired with the topic it was published to.
#[derive(Clone, Debug)]
pub struct TopicNotice {
    pub topic: String,
    pub notice: Notice,
}

/// In-memory notice bus using a tokio broadcast channel.
///
/// Notices are published to the broadcast channel tagged with their topic;
/// topic filtering is done on the consumer side. Only the orders topic is
/// consumed, matching the broker deployment where outcome topics have no
/// subscriber in this service.
pub struct ChannelNoticeBus {
    /// Broadcast sender for publishing notices.
    sender: broadcast::Sender<TopicNotice>,
    /// Configuration including topic names.
    config: ChannelConfig,
    /// Registered notice handlers.
    handlers: Arc<RwLock<Vec<Box<dyn NoticeHandler>>>>,
    /// Flag indicating if the consumer task is running.
    consuming: Arc<RwLock<bool>>,
}

impl ChannelNoticeBus {
    /// Create a new channel notice bus.
    pub fn new(config: ChannelConfig) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        info!(
            orders_topic = %config.orders_topic,
            inventory_topic = %config.inventory_topic,
            "Channel notice bus initialized"
        );

        Self {
            sender,
            config,
            handlers: Arc::new(RwLock::new(Vec::new())),
            consuming: Arc::new(RwLock::new(false)),
        }
    }

    /// Get a clone of the sender, for tapping the raw topic/notice stream.
    pub fn sender(&self) -> broadcast::Sender<TopicNotice> {
        self.sender.clone()
    }

    /// Start consuming notices (call after subscribe).
    async fn start_consuming_impl(&self) -> Result<()> {
        // Check if already consuming
        {
            let mut consuming = self.consuming.write().await;
            if *consuming {
                return Ok(());
            }
            *consuming = true;
        }

        let mut receiver = self.sender.subscribe();
        let handlers = self.handlers.clone();
        let orders_topic = self.config.orders_topic.clone();

        // Spawn consumer task
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        // Only the orders topic is consumed; outcome notices
                        // pass through to any external taps.
                        if message.topic != orders_topic {
                            continue;
                        }

                        debug!(
                            topic = %message.topic,
                            kind = message.notice.kind(),
                            "Received notice via channel"
                        );

                        // Call all handlers
                        super::dispatch_to_handlers(&handlers, &message.notice).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        error!(skipped = n, "Channel consumer lagged, skipped notices");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Channel closed, stopping consumer");
                        break;
                    }
                }
            }
        });

        info!(topic = %self.config.orders_topic, "Channel consumer started");

        Ok(())
    }
}

#[async_trait]
impl NoticeBus for ChannelNoticeBus {
    #[tracing::instrument(name = "bus.publish", skip_all, fields(kind = notice.kind()))]
    async fn publish(&self, notice: &Notice) -> Result<()> {
        let topic = self.config.topic_for(notice).to_string();
        let message = TopicNotice {
            topic: topic.clone(),
            notice: notice.clone(),
        };

        // Send to channel (ignore error if no receivers)
        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(
                    topic = %topic,
                    receivers = receiver_count,
                    "Published notice to channel"
                );
            }
            Err(_) => {
                // No receivers, that's okay for publish-only scenarios
                debug!(topic = %topic, "Published notice (no receivers)");
            }
        }

        Ok(())
    }

    async fn subscribe(&self, handler: Box<dyn NoticeHandler>) -> Result<()> {
        let count = {
            let mut handlers = self.handlers.write().await;
            handlers.push(handler);
            handlers.len()
        };

        info!(handler_count = count, "Handler subscribed to channel bus");

        Ok(())
    }

    async fn start_consuming(&self) -> Result<()> {
        self.start_consuming_impl().await
    }
}
