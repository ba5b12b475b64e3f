// Dashboard service - Shared view state fed by the poller and the brush widgets
use crate::application::live_window::{GrowthOutcome, LiveWindowController, RangeOutcome};
use crate::domain::chart::{ChartId, ChartPoint, ChartView, DashboardView};
use crate::domain::range::{RangeError, RangeOrigin, VisibleRange};
use crate::domain::sample::{LatestReadings, Sample, SampleHistory, time_label};
use crate::infrastructure::config::{ChartConfig, DashboardSettings};
use anyhow::Context;
use chrono::FixedOffset;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

struct ViewState {
    history: SampleHistory,
    controller: LiveWindowController<Sample>,
}

/// State of one chart after a range-change notification
#[derive(Debug, Clone, PartialEq)]
pub struct RangeChange {
    pub outcome: RangeOutcome,
    pub range: Option<VisibleRange>,
    pub live: Option<bool>,
    pub displayed_length: usize,
}

#[derive(Clone)]
pub struct DashboardService {
    state: Arc<RwLock<ViewState>>,
    charts: Arc<Vec<ChartConfig>>,
    offset: FixedOffset,
}

impl DashboardService {
    pub fn new(settings: &DashboardSettings) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for chart in &settings.charts {
            if !seen.insert(chart.id.as_str()) {
                anyhow::bail!("Duplicate chart id in dashboard config: {}", chart.id);
            }
        }

        let offset = settings
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("Invalid UTC offset: {} minutes", settings.utc_offset_minutes))?;

        let history = SampleHistory::new();
        let controller = LiveWindowController::new(
            settings.charts.iter().map(|c| ChartId::new(c.id.as_str())),
            history.snapshot(),
        );

        Ok(Self {
            state: Arc::new(RwLock::new(ViewState {
                history,
                controller,
            })),
            charts: Arc::new(settings.charts.clone()),
            offset,
        })
    }

    /// Apply a full history snapshot from the sensor source
    pub async fn ingest_snapshot(&self, samples: Vec<Sample>) -> GrowthOutcome {
        let mut state = self.state.write().await;
        if !state.history.replace(samples) {
            return GrowthOutcome::NoGrowth;
        }
        let snapshot = state.history.snapshot();
        let outcome = state.controller.on_data_grown(snapshot);
        tracing::debug!(
            "History now holds {} samples, {} displayed",
            state.controller.authoritative_len(),
            state.controller.displayed().len()
        );
        outcome
    }

    /// Append the newest reading from the sensor source
    pub async fn ingest_latest(&self, sample: Sample) -> GrowthOutcome {
        let mut state = self.state.write().await;
        if !state.history.push_latest(sample) {
            return GrowthOutcome::NoGrowth;
        }
        let snapshot = state.history.snapshot();
        state.controller.on_data_grown(snapshot)
    }

    pub async fn change_range(
        &self,
        chart: &ChartId,
        range: VisibleRange,
        origin: RangeOrigin,
    ) -> RangeChange {
        let mut state = self.state.write().await;
        let outcome = state.controller.on_range_change(chart, range, origin);
        Self::describe(&state.controller, chart, outcome)
    }

    /// Report a range request that could not even be expressed as a range
    pub async fn reject_range(&self, chart: &ChartId, error: RangeError) -> RangeChange {
        let state = self.state.read().await;
        let outcome = match state.controller.range(chart) {
            Some(_) => RangeOutcome::Rejected(error),
            None => RangeOutcome::UnknownChart,
        };
        Self::describe(&state.controller, chart, outcome)
    }

    fn describe(
        controller: &LiveWindowController<Sample>,
        chart: &ChartId,
        outcome: RangeOutcome,
    ) -> RangeChange {
        RangeChange {
            outcome,
            range: controller.range(chart),
            live: controller.is_live(chart),
            displayed_length: controller.displayed().len(),
        }
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.read().await;
        let controller = &state.controller;
        let displayed = controller.displayed();

        let charts = controller
            .charts()
            .zip(self.charts.iter())
            .map(|(id, config)| {
                let points = displayed
                    .iter()
                    .map(|sample| ChartPoint {
                        timestamp: sample.timestamp,
                        time: self.time_label(sample.timestamp),
                        value: config.metric.value(sample),
                        predicted: config.metric.predicted(sample),
                    })
                    .collect();

                ChartView {
                    visible_length: controller.visible(id).map_or(0, <[Sample]>::len),
                    range: controller.range(id).unwrap_or_default(),
                    live: controller.is_live(id).unwrap_or(true),
                    id: id.clone(),
                    title: config.title.clone(),
                    unit: config.unit.clone(),
                    metric: config.metric,
                    points,
                }
            })
            .collect();

        DashboardView {
            latest: LatestReadings::from_samples(&state.history.snapshot()),
            displayed_length: displayed.len(),
            pending: controller.pending(),
            charts,
        }
    }

    /// Authoritative history, including samples not yet displayed
    pub async fn history(&self) -> Arc<Vec<Sample>> {
        self.state.read().await.history.snapshot()
    }

    pub async fn latest(&self) -> Option<Sample> {
        self.state.read().await.history.last().cloned()
    }

    pub fn time_label(&self, timestamp: i64) -> String {
        time_label(timestamp, self.offset)
    }
}
