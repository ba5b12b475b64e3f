// Repository trait for sensor data access
use crate::domain::sample::Sample;
use async_trait::async_trait;

#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Fetch the full sample history, oldest first
    async fn fetch_all(&self) -> anyhow::Result<Vec<Sample>>;

    /// Fetch only the newest sample
    async fn fetch_last(&self) -> anyhow::Result<Option<Sample>>;

    /// Whether the source has the settings it needs to be queried
    fn is_configured(&self) -> bool;
}
