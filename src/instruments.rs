//! Instruments and Quantities
//!
//! Financial instruments with fixed decimal precision, and exact decimal
//! amounts denominated in them.

use rust_decimal::Decimal;
use std::fmt;

use crate::error::{Result, TradeframeError};

/// US dollar, 2 decimal places
pub const USD: Instrument = Instrument::new("USD", 2);

/// Bitcoin, 8 decimal places
pub const BTC: Instrument = Instrument::new("BTC", 8);

/// A tradeable instrument: symbol plus quantization precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub symbol: &'static str,
    pub precision: u32,
}

impl Instrument {
    pub const fn new(symbol: &'static str, precision: u32) -> Self {
        Self { symbol, precision }
    }

    /// An amount of this instrument, quantized to its precision
    pub fn amount(&self, amount: Decimal) -> Quantity {
        Quantity {
            instrument: *self,
            amount: amount.round_dp(self.precision),
        }
    }

    /// The zero quantity of this instrument
    pub fn zero(&self) -> Quantity {
        self.amount(Decimal::ZERO)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// An exact amount of a single instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    pub instrument: Instrument,
    pub amount: Decimal,
}

impl Quantity {
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Sum with another quantity of the same instrument
    pub fn checked_add(&self, other: &Quantity) -> Result<Quantity> {
        self.ensure_same_instrument(other)?;
        Ok(self.instrument.amount(self.amount + other.amount))
    }

    /// Difference with another quantity of the same instrument.
    ///
    /// Going negative is the caller's insufficient-funds case, signalled
    /// here as `Validation` since no wallet is known at this level.
    pub fn checked_sub(&self, other: &Quantity) -> Result<Quantity> {
        self.ensure_same_instrument(other)?;
        let amount = self.amount - other.amount;
        if amount < Decimal::ZERO {
            return Err(TradeframeError::Validation(format!(
                "quantity underflow: {self} - {other}"
            )));
        }
        Ok(self.instrument.amount(amount))
    }

    fn ensure_same_instrument(&self, other: &Quantity) -> Result<()> {
        if self.instrument != other.instrument {
            return Err(TradeframeError::InstrumentMismatch {
                expected: self.instrument.symbol.to_string(),
                got: other.instrument.symbol.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.instrument.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_quantizes_to_precision() {
        let q = USD.amount(dec!(10.005));
        assert_eq!(q.amount, dec!(10.00)); // bankers rounding at the tie

        let b = BTC.amount(dec!(0.123456789));
        assert_eq!(b.amount, dec!(0.12345679));
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = USD.amount(dec!(10));
        let b = USD.amount(dec!(2.50));

        assert_eq!(a.checked_add(&b).unwrap().amount, dec!(12.50));
        assert_eq!(a.checked_sub(&b).unwrap().amount, dec!(7.50));

        let underflow = b.checked_sub(&a).unwrap_err();
        assert!(matches!(underflow, TradeframeError::Validation(_)));

        let mismatch = a.checked_add(&BTC.amount(dec!(1))).unwrap_err();
        assert!(matches!(
            mismatch,
            TradeframeError::InstrumentMismatch { .. }
        ));
    }
}
