use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

use crate::feed::SeriesConfig;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Synthetic price series settings
    #[serde(default)]
    pub series: SeriesConfig,
    /// Episode settings
    #[serde(default)]
    pub episode: EpisodeConfig,
    /// Mapping handed to `TradingContext::enter` before building the
    /// environment (categories plus the reserved `shared` key)
    #[serde(default = "default_context")]
    pub context: Value,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeConfig {
    /// Initial cash balance in base currency
    #[serde(default = "default_initial_cash")]
    pub initial_cash: Decimal,
    /// Truncate the episode after this many steps (0 = run feed to the end)
    #[serde(default)]
    pub max_steps: usize,
    /// Emit a progress log every N steps
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

fn default_initial_cash() -> Decimal {
    dec!(10_000)
}

fn default_log_every() -> usize {
    50
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            max_steps: 0,
            log_every: default_log_every(),
        }
    }
}

fn default_context() -> Value {
    json!({
        "actions": { "trade_fraction": 1.0 },
        "rewards": { "scale": 1.0 },
        "exchanges": { "commission": 0.0025 },
        "shared": {
            "base_currency": "USD",
            "base_precision": 2,
            "instrument_precision": 8
        }
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Crate log level (trace, debug, info, warn, error); `RUST_LOG`
    /// overrides the whole filter
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None::<&Path>)
    }

    /// Load configuration, optionally from an explicit file
    pub fn load_from<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().set_default("logging.level", "debug")?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path.as_ref()).required(true)),
            None => builder.add_source(File::with_name("config/default").required(false)),
        };

        // Override with environment variables (TRADEFRAME_EPISODE__MAX_STEPS, etc.)
        builder = builder.add_source(
            Environment::with_prefix("TRADEFRAME")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.series.steps == 0 {
            errors.push("series.steps must be positive".to_string());
        }
        if self.series.initial_price <= 0.0 {
            errors.push("series.initial_price must be positive".to_string());
        }
        if self.series.volatility < 0.0 {
            errors.push("series.volatility must be non-negative".to_string());
        }
        if self.episode.initial_cash <= Decimal::ZERO {
            errors.push("episode.initial_cash must be positive".to_string());
        }
        if self.episode.log_every == 0 {
            errors.push("episode.log_every must be positive".to_string());
        }
        if !self.context.is_object() {
            errors.push("context must be a mapping".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            series: SeriesConfig::default(),
            episode: EpisodeConfig::default(),
            context: default_context(),
            logging: LoggingConfig::default(),
        }
    }
}
