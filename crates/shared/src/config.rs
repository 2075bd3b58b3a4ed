//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Report rendering settings.
    #[serde(default)]
    pub reports: ReportSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL of the ERP database.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Settings shared by every report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportSettings {
    /// Maximum number of entries plotted in a chart.
    #[serde(default = "default_chart_limit")]
    pub chart_limit: usize,
    /// Length of the window used when a report is run month-wise.
    #[serde(default = "default_monthwise_window_days")]
    pub monthwise_window_days: u64,
}

fn default_chart_limit() -> usize {
    10
}

fn default_monthwise_window_days() -> u64 {
    30
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            chart_limit: default_chart_limit(),
            monthwise_window_days: default_monthwise_window_days(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERLENS")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(toml: &str) -> Result<AppConfig, config::ConfigError> {
        AppConfig::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_report_settings_defaults() {
        let settings = ReportSettings::default();
        assert_eq!(settings.chart_limit, 10);
        assert_eq!(settings.monthwise_window_days, 30);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = from_toml(
            r#"
            [server]
            port = 9090

            [database]
            url = "postgres://erp@localhost/erp"

            [reports]
            chart_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "postgres://erp@localhost/erp");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.reports.chart_limit, 5);
        assert_eq!(config.reports.monthwise_window_days, 30);
    }

    #[test]
    fn test_reports_section_is_optional() {
        let config = from_toml(
            r#"
            [server]
            host = "127.0.0.1"

            [database]
            url = "postgres://erp@localhost/erp"
            "#,
        )
        .unwrap();

        assert_eq!(config.reports, ReportSettings::default());
    }

    #[test]
    fn test_load_fails_without_database_url() {
        assert!(from_toml("[server]\nport = 8080\n[database]\n").is_err());
    }
}
