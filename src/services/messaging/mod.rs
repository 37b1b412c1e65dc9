pub mod connector;

use async_trait::async_trait;

use crate::models::Activity;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Sends `text` as a reply to `activity` in its conversation.
    async fn send_reply(&self, activity: &Activity, text: &str) -> anyhow::Result<()>;
}
