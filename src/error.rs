use thiserror::Error;

/// Main error type for the framework
#[derive(Error, Debug)]
pub enum TradeframeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("No active trading context for category '{category}'")]
    ConfigurationUnavailable { category: String },

    #[error("Trading context exited with no matching enter")]
    ScopeImbalance,

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // OMS errors
    #[error("Insufficient funds in wallet '{wallet}': requested {requested}, available {available}")]
    InsufficientFunds {
        wallet: String,
        requested: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("Instrument mismatch: expected {expected}, got {got}")]
    InstrumentMismatch { expected: String, got: String },

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    // Feed errors
    #[error("Feed exhausted")]
    FeedExhausted,

    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for TradeframeError
pub type Result<T> = std::result::Result<T, TradeframeError>;
