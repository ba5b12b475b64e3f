// Firebase realtime-database repository implementation
use crate::application::sensor_repository::SensorRepository;
use crate::domain::sample::Sample;
use crate::infrastructure::config::{SourceSettings, source_url};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct FirebaseRepository {
    client: reqwest::Client,
    url: Option<String>,
    auth_token: Option<String>,
}

impl FirebaseRepository {
    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: settings
                .database_url
                .as_deref()
                .map(|base| source_url(base, &settings.path)),
            auth_token: settings.auth_token.clone(),
        }
    }

    async fn fetch_records(&self) -> Result<Value> {
        let (Some(url), Some(token)) = (&self.url, &self.auth_token) else {
            anyhow::bail!("Sensor source is not configured (database_url / auth_token)");
        };

        let response = self
            .client
            .get(url)
            .query(&[("auth", token)])
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to sensor database")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sensor database request failed with status {}: {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse sensor database response")
    }

    /// Turn `{ "<key>": { "hum", "temp", "timestamp" } }` into samples, oldest first
    fn parse_records(body: &Value) -> Vec<Sample> {
        let Some(records) = body.as_object() else {
            return Vec::new();
        };

        let mut samples: Vec<Sample> = records
            .iter()
            .filter_map(|(key, record)| {
                let record = record.as_object()?;
                let (Some(temperature), Some(humidity)) = (
                    record.get("temp").and_then(number),
                    record.get("hum").and_then(number),
                ) else {
                    tracing::debug!("Skipping record {} without temp/hum readings", key);
                    return None;
                };
                let timestamp = record
                    .get("timestamp")
                    .and_then(number)
                    .map(|ts| ts as i64)
                    .unwrap_or(0);

                Some(Sample::new(timestamp, temperature, humidity).with_id(key.as_str()))
            })
            .collect();

        samples.sort_by_key(|s| s.timestamp);
        samples
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl SensorRepository for FirebaseRepository {
    async fn fetch_all(&self) -> Result<Vec<Sample>> {
        let body = self.fetch_records().await?;
        let samples = Self::parse_records(&body);
        tracing::debug!("Fetched {} samples from sensor database", samples.len());
        Ok(samples)
    }

    async fn fetch_last(&self) -> Result<Option<Sample>> {
        // TODO: query with orderBy="timestamp"&limitToLast=1 once the database has an index on timestamp
        let body = self.fetch_records().await?;
        Ok(Self::parse_records(&body).pop())
    }

    fn is_configured(&self) -> bool {
        self.url.is_some() && self.auth_token.is_some()
    }
}
