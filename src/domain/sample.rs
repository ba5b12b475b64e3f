// Sensor sample domain model
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display value used in the header when no reading exists yet
pub const MISSING_READING: &str = "--";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_humidity: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: i64, temperature: f64, humidity: f64) -> Self {
        Self {
            id: None,
            timestamp,
            temperature,
            humidity,
            predicted_temperature: None,
            predicted_humidity: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// The authoritative, append-only sequence of samples.
///
/// Readers get cheap `Arc` snapshots; a snapshot never changes after it
/// has been handed out.
#[derive(Debug, Clone, Default)]
pub struct SampleHistory {
    samples: Arc<Vec<Sample>>,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Vec<Sample>> {
        self.samples.clone()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Replace the history with a full poll snapshot.
    /// Returns `true` when the history grew.
    pub fn replace(&mut self, snapshot: Vec<Sample>) -> bool {
        let current = self.samples.len();
        if snapshot.len() <= current {
            tracing::debug!(
                "Ignoring snapshot of {} samples, history already holds {}",
                snapshot.len(),
                current
            );
            return false;
        }

        if let Some(tail) = self.samples.last() {
            let at_tail = snapshot[current - 1].timestamp;
            if at_tail != tail.timestamp {
                tracing::warn!(
                    "Snapshot is not an extension of the current history (tail {} vs {})",
                    tail.timestamp,
                    at_tail
                );
            }
        }

        self.samples = Arc::new(snapshot);
        true
    }

    /// Append the newest reading unless the tail already covers it.
    /// Returns `true` when the sample was appended.
    pub fn push_latest(&mut self, sample: Sample) -> bool {
        if let Some(tail) = self.samples.last() {
            if sample.timestamp <= tail.timestamp {
                if sample.timestamp < tail.timestamp {
                    tracing::debug!(
                        "Dropping out-of-order sample {} (tail is {})",
                        sample.timestamp,
                        tail.timestamp
                    );
                }
                return false;
            }
        }

        Arc::make_mut(&mut self.samples).push(sample);
        true
    }
}

/// Header values shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReadings {
    pub temperature: String,
    pub humidity: String,
    pub timestamp: Option<i64>,
}

impl LatestReadings {
    pub fn from_samples(samples: &[Sample]) -> Self {
        match samples.last() {
            Some(latest) => Self {
                temperature: latest.temperature.to_string(),
                humidity: latest.humidity.to_string(),
                timestamp: Some(latest.timestamp),
            },
            None => Self {
                temperature: MISSING_READING.to_string(),
                humidity: MISSING_READING.to_string(),
                timestamp: None,
            },
        }
    }
}

/// Two-line "date\ntime" label for a sample timestamp (seconds)
pub fn time_label(timestamp: i64, offset: FixedOffset) -> String {
    if timestamp <= 0 {
        return "N/A".to_string();
    }

    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc
            .with_timezone(&offset)
            .format("%d.%m.%Y\n%H:%M:%S")
            .to_string(),
        None => "N/A".to_string(),
    }
}
