use super::LineUserId;
use color_eyre::eyre::Report;
use thiserror::Error;

#[async_trait::async_trait]
pub trait NotificationSender {
    async fn send(
        &self,
        to: &LineUserId,
        text: &str,
    ) -> Result<(), NotificationDeliveryError>;
}

#[derive(Debug, Error)]
#[error("Failed to deliver notification to {to}")]
pub struct NotificationDeliveryError {
    pub to: LineUserId,
    #[source]
    pub source: Report,
}

impl NotificationDeliveryError {
    pub fn new(to: &LineUserId, source: Report) -> Self {
        Self {
            to: to.clone(),
            source,
        }
    }
}
