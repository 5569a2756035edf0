use async_trait::async_trait;

use crate::repository::RepoError;

/// Outbound domain-event sink (Kafka in deployment).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RepoError>;
}

/// Publisher used when no broker is configured: events only reach the log.
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RepoError> {
        tracing::debug!("Event {}/{}: {}", topic, key, payload);
        Ok(())
    }
}
