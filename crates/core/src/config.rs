use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `FUNNELBOARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Path to the funnel CSV. The file is loaded once per process and
    /// never re-read.
    #[serde(default = "default_dataset_path")]
    pub path: String,
    /// Fixed per-impression cost used to derive CPI.
    #[serde(default = "default_unit_cost")]
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Enables the DAU/MAU/stickiness module.
    #[serde(default = "default_enable_activity")]
    pub enable_activity: bool,
    /// Two-tailed significance threshold for the A/B test.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Control campaign of the A/B comparison.
    #[serde(default = "default_control_campaign")]
    pub control_campaign: String,
    /// Treatment campaign of the A/B comparison.
    #[serde(default = "default_treatment_campaign")]
    pub treatment_campaign: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_dataset_path() -> String {
    "data/mobile_funnel_data.csv".to_string()
}
fn default_unit_cost() -> f64 {
    0.01
}
fn default_enable_activity() -> bool {
    true
}
fn default_alpha() -> f64 {
    0.05
}
fn default_control_campaign() -> String {
    "A".to_string()
}
fn default_treatment_campaign() -> String {
    "B".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            unit_cost: default_unit_cost(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enable_activity: default_enable_activity(),
            alpha: default_alpha(),
            control_campaign: default_control_campaign(),
            treatment_campaign: default_treatment_campaign(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            analytics: AnalyticsConfig::default(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("FUNNELBOARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
