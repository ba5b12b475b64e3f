use crate::domain::chart::Metric;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins, empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Built frontend served for every non-API path
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub database_url: Option<String>,
    pub auth_token: Option<String>,
    #[serde(default = "default_source_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub metric: Metric,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_source_path() -> String {
    "data".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_charts() -> Vec<ChartConfig> {
    vec![
        ChartConfig {
            id: "temperature".to_string(),
            title: "Temperature".to_string(),
            unit: Some("°C".to_string()),
            metric: Metric::Temperature,
        },
        ChartConfig {
            id: "humidity".to_string(),
            title: "Humidity".to_string(),
            unit: Some("%".to_string()),
            metric: Metric::Humidity,
        },
    ]
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: Vec::new(),
            static_dir: None,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            auth_token: None,
            path: default_source_path(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            utc_offset_minutes: 0,
            charts: default_charts(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__*` env vars
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Build the REST URL of a database path, e.g. `https://db.example/data.json`
pub fn source_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}.json",
        base.trim_end_matches('/'),
        path.trim_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url() {
        assert_eq!(
            source_url("https://sensors.example.com/", "data"),
            "https://sensors.example.com/data.json"
        );
        assert_eq!(
            source_url("https://sensors.example.com", "/rooms/kitchen/"),
            "https://sensors.example.com/rooms/kitchen.json"
        );
    }

    #[test]
    fn test_defaults_from_empty_source() {
        let settings = config::Config::builder().build().unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert!(config.server.cors_origins.is_empty());
        assert!(config.server.static_dir.is_none());
        assert_eq!(config.dashboard.poll_interval_ms, 2000);
        assert_eq!(config.dashboard.charts.len(), 2);
        assert_eq!(config.dashboard.charts[1].metric, Metric::Humidity);
        assert!(config.source.auth_token.is_none());
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [server]
            cors_origins = ["http://localhost:5173"]
            static_dir = "frontend/dist"

            [source]
            database_url = "https://sensors.example.com"
            auth_token = "secret"

            [dashboard]
            poll_interval_ms = 500

            [[dashboard.charts]]
            id = "temp"
            title = "Kitchen"
            metric = "temperature"
        "#;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.server.static_dir.as_deref(), Some("frontend/dist"));
        assert_eq!(config.source.database_url.as_deref(), Some("https://sensors.example.com"));
        assert_eq!(config.source.path, "data");
        assert_eq!(config.dashboard.poll_interval_ms, 500);
        assert_eq!(
            config.dashboard.charts,
            vec![ChartConfig {
                id: "temp".to_string(),
                title: "Kitchen".to_string(),
                unit: None,
                metric: Metric::Temperature,
            }]
        );
    }
}
