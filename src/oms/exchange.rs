//! Simulated exchange quoting a single price stream

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::context::Component;
use crate::error::{Result, TradeframeError};
use crate::feed::PriceStream;

/// Execution options, context-configurable under the `exchanges` category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeOptions {
    /// Commission charged on each fill, as a fraction of notional
    pub commission: Decimal,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self {
            commission: dec!(0.0025),
        }
    }
}

impl Component for ExchangeOptions {
    const CATEGORY: &'static str = "exchanges";
}

impl ExchangeOptions {
    /// Resolve options from the active trading context.
    ///
    /// Fails outside any scope; missing keys fall back to defaults.
    pub fn from_context() -> Result<Self> {
        let cfg = Self::resolve()?;
        let defaults = Self::default();
        Ok(Self {
            commission: cfg.get_or("commission", defaults.commission),
        })
    }
}

/// An exchange quoting closes from one price stream
#[derive(Debug, Clone)]
pub struct Exchange {
    id: String,
    stream: PriceStream,
    options: ExchangeOptions,
}

impl Exchange {
    pub fn new(id: impl Into<String>, stream: PriceStream) -> Self {
        Self::with_options(id, stream, ExchangeOptions::default())
    }

    pub fn with_options(
        id: impl Into<String>,
        stream: PriceStream,
        options: ExchangeOptions,
    ) -> Self {
        Self {
            id: id.into(),
            stream,
            options,
        }
    }

    /// Construct with options resolved from the active trading context
    pub fn from_context(id: impl Into<String>, stream: PriceStream) -> Result<Self> {
        Ok(Self::with_options(id, stream, ExchangeOptions::from_context()?))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stream(&self) -> &PriceStream {
        &self.stream
    }

    pub fn options(&self) -> &ExchangeOptions {
        &self.options
    }

    /// Quoted price at a feed step, as an exact decimal
    pub fn quote(&self, step: usize) -> Result<Decimal> {
        let close = self.stream.at(step)?;
        Decimal::from_f64(close).ok_or_else(|| {
            TradeframeError::Validation(format!("unrepresentable quote {close} at step {step}"))
        })
    }
}
