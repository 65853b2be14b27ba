//! Market orders and simulated execution
//!
//! Orders fill immediately at the exchange quote for the current step,
//! less commission. Funds are checked before any balance moves, so a
//! rejected order leaves the portfolio untouched.

use rust_decimal::Decimal;
use tracing::debug;

use super::{Exchange, Portfolio};
use crate::error::{Result, TradeframeError};
use crate::instruments::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A market order against the exchange's quoted price.
///
/// `size` is base-currency notional for buys and asset quantity for sells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketOrder {
    pub side: OrderSide,
    pub size: Decimal,
}

/// Result of an executed order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub side: OrderSide,
    /// Quoted price the order filled at
    pub price: Decimal,
    /// Asset quantity that changed hands
    pub size: Decimal,
    /// Commission paid, in base units
    pub commission: Decimal,
    /// Feed step the fill happened at
    pub step: usize,
}

/// Execute a market order between the portfolio's base wallet and its
/// `asset` wallet at the step's quote.
pub fn execute_order(
    order: &MarketOrder,
    exchange: &Exchange,
    portfolio: &mut Portfolio,
    asset: Instrument,
    step: usize,
) -> Result<Fill> {
    if order.size <= Decimal::ZERO {
        return Err(TradeframeError::OrderRejected(format!(
            "non-positive order size {}",
            order.size
        )));
    }

    let base = portfolio.base_instrument();
    let price = exchange.quote(step)?;
    if price <= Decimal::ZERO {
        return Err(TradeframeError::OrderRejected(format!(
            "non-positive quote {price} at step {step}"
        )));
    }
    let rate = exchange.options().commission;

    let fill = match order.side {
        OrderSide::Buy => {
            let notional = base.amount(order.size);
            let commission = base.amount(notional.amount * rate);
            let asset_qty = asset.amount((notional.amount - commission.amount) / price);

            portfolio.wallet_mut(base)?.withdraw(notional)?;
            portfolio.wallet_mut(asset)?.deposit(asset_qty)?;

            Fill {
                side: OrderSide::Buy,
                price,
                size: asset_qty.amount,
                commission: commission.amount,
                step,
            }
        }
        OrderSide::Sell => {
            let quantity = asset.amount(order.size);
            let gross = quantity.amount * price;
            let commission = base.amount(gross * rate);
            let proceeds = base.amount(gross - commission.amount);

            portfolio.wallet_mut(asset)?.withdraw(quantity)?;
            portfolio.wallet_mut(base)?.deposit(proceeds)?;

            Fill {
                side: OrderSide::Sell,
                price,
                size: quantity.amount,
                commission: commission.amount,
                step,
            }
        }
    };

    debug!(
        side = ?fill.side,
        price = %fill.price,
        size = %fill.size,
        commission = %fill.commission,
        step,
        "order filled"
    );

    Ok(fill)
}
