//! Client configuration

use std::time::Duration;

use clap::Args;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Commerce backend settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront API
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:5000/")]
    pub api_url: String,

    /// Token used for requests until a customer signs in
    #[arg(long, env = "STOREFRONT_GUEST_TOKEN", hide_env_values = true)]
    pub guest_token: String,

    /// Token of an already signed-in customer
    #[arg(long, env = "STOREFRONT_CUSTOMER_TOKEN", hide_env_values = true)]
    pub customer_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "STOREFRONT_TIMEOUT_SECONDS", default_value_t = 30u64)]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Output settings.
#[derive(Debug, Clone, Args)]
pub struct DisplayConfig {
    /// ISO currency code used for cart totals
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "USD")]
    pub currency: String,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// All settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    #[command(flatten)]
    pub api: ApiConfig,

    #[command(flatten)]
    pub display: DisplayConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
