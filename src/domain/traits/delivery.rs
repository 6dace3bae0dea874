use async_trait::async_trait;
use crate::application::errors::DeliveryError;

/// Delivery trait - abstraction for posting replies to a chat platform
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Post `text` to `channel_id` using the group's bot credential
    async fn deliver(&self, channel_id: &str, text: &str, credential: &str) -> Result<(), DeliveryError>;

    /// Short platform name for logs
    fn platform(&self) -> &str;
}
