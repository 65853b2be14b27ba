pub mod cli;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod feed;
pub mod instruments;
pub mod oms;

pub use config::AppConfig;
pub use context::{Component, ContextGuard, ResolvedConfig, TradingContext};
pub use env::{
    ActionScheme, ActionSpace, Bsh, EnvParams, EpisodeInfo, PositionReturns, RewardScheme,
    StepOutcome, TradingEnv,
};
pub use error::{Result, TradeframeError};
pub use feed::{DataFeed, PriceSeries, PriceStream, SeriesConfig};
pub use instruments::{Instrument, Quantity, BTC, USD};
pub use oms::{Exchange, ExchangeOptions, Fill, MarketOrder, OrderSide, Portfolio, Wallet};
