// Poller - Periodically pulls samples from the sensor source into the dashboard
use crate::application::dashboard_service::DashboardService;
use crate::application::live_window::GrowthOutcome;
use crate::application::sensor_repository::SensorRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub struct Poller {
    repository: Arc<dyn SensorRepository>,
    service: DashboardService,
    interval: Duration,
    history_loaded: bool,
}

impl Poller {
    pub fn new(
        repository: Arc<dyn SensorRepository>,
        service: DashboardService,
        interval: Duration,
    ) -> Self {
        Self {
            repository,
            service,
            interval,
            history_loaded: false,
        }
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Polling sensor source every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Poller stopped");
    }

    /// Full history on the first successful poll, newest sample afterwards
    pub async fn tick(&mut self) -> GrowthOutcome {
        if !self.history_loaded {
            return match self.repository.fetch_all().await {
                Ok(samples) => {
                    self.history_loaded = true;
                    tracing::info!("Loaded {} samples of history", samples.len());
                    self.service.ingest_snapshot(samples).await
                }
                Err(e) => {
                    tracing::warn!("Error fetching sample history: {:#}", e);
                    GrowthOutcome::NoGrowth
                }
            };
        }

        match self.repository.fetch_last().await {
            Ok(Some(sample)) => {
                let outcome = self.service.ingest_latest(sample).await;
                tracing::debug!("Poll outcome: {:?}", outcome);
                outcome
            }
            Ok(None) => GrowthOutcome::NoGrowth,
            Err(e) => {
                tracing::warn!("Error fetching latest sample: {:#}", e);
                GrowthOutcome::NoGrowth
            }
        }
    }
}
