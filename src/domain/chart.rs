// Chart and dashboard read models
use super::range::VisibleRange;
use super::sample::{LatestReadings, Sample};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(String);

impl ChartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChartId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Sample field plotted by a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Humidity,
}

impl Metric {
    pub fn value(&self, sample: &Sample) -> f64 {
        match self {
            Metric::Temperature => sample.temperature,
            Metric::Humidity => sample.humidity,
        }
    }

    pub fn predicted(&self, sample: &Sample) -> Option<f64> {
        match self {
            Metric::Temperature => sample.predicted_temperature,
            Metric::Humidity => sample.predicted_humidity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub timestamp: i64,
    pub time: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub id: ChartId,
    pub title: String,
    pub unit: Option<String>,
    pub metric: Metric,
    pub range: VisibleRange,
    pub live: bool,
    pub visible_length: usize,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub latest: LatestReadings,
    pub displayed_length: usize,
    pub pending: usize,
    pub charts: Vec<ChartView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_selects_field() {
        let mut sample = Sample::new(1, 21.0, 55.0);
        sample.predicted_humidity = Some(57.0);

        assert_eq!(Metric::Temperature.value(&sample), 21.0);
        assert_eq!(Metric::Humidity.value(&sample), 55.0);
        assert_eq!(Metric::Temperature.predicted(&sample), None);
        assert_eq!(Metric::Humidity.predicted(&sample), Some(57.0));
    }

    #[test]
    fn test_chart_id_serializes_as_string() {
        let id = ChartId::from("humidity");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"humidity\"");
        assert_eq!(id.to_string(), "humidity");
    }
}
