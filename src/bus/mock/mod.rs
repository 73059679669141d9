//! Mock notice bus implementation for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BusError, NoticeBus, NoticeHandler, Result};
use crate::messages::Notice;

/// Mock notice bus for testing.
///
/// Records published notices for later inspection; subscribing is not
/// supported.
#[derive(Default)]
pub struct MockNoticeBus {
    published: RwLock<Vec<Notice>>,
    fail_on_publish: RwLock<bool>,
}

impl MockNoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_publish(&self, fail: bool) {
        *self.fail_on_publish.write().await = fail;
    }

    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }

    pub async fn take_published(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.published.write().await)
    }
}

#[async_trait]
impl NoticeBus for MockNoticeBus {
    async fn publish(&self, notice: &Notice) -> Result<()> {
        if *self.fail_on_publish.read().await {
            return Err(BusError::Connection("Mock publish failure".to_string()));
        }
        self.published.write().await.push(notice.clone());
        Ok(())
    }

    async fn subscribe(&self, _handler: Box<dyn NoticeHandler>) -> Result<()> {
        Err(BusError::SubscribeNotSupported)
    }

    async fn start_consuming(&self) -> Result<()> {
        Err(BusError::SubscribeNotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_notice_bus_publish() {
        let bus = MockNoticeBus::new();
        let notice = Notice::InventoryUpdated {
            item_id: 13401,
            current_stock_units: 3,
        };

        bus.publish(&notice).await.unwrap();

        assert_eq!(bus.published_count().await, 1);
        assert_eq!(bus.take_published().await, vec![notice]);
        assert_eq!(bus.published_count().await, 0);
    }

    #[tokio::test]
    async fn test_mock_notice_bus_fail_on_publish() {
        let bus = MockNoticeBus::new();
        bus.set_fail_on_publish(true).await;

        let notice = Notice::InvalidOrder { item_id: 13401 };
        let result = bus.publish(&notice).await;

        assert!(result.is_err());
        assert_eq!(bus.published_count().await, 0);
    }

    #[tokio::test]
    async fn test_mock_notice_bus_subscribe_not_supported() {
        let bus = MockNoticeBus::new();

        struct DummyHandler;
        impl NoticeHandler for DummyHandler {
            fn handle(
                &self,
                _notice: Notice,
            ) -> futures::future::BoxFuture<'static, std::result::Result<(), BusError>> {
                Box::pin(async { Ok(()) })
            }
        }

        let result = bus.subscribe(Box::new(DummyHandler)).await;
        assert!(matches!(result, Err(BusError::SubscribeNotSupported)));
    }
}
