//! Action schemes
//!
//! Map discrete agent actions onto orders against the portfolio.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::context::Component;
use crate::error::Result;
use crate::instruments::Instrument;
use crate::oms::{execute_order, Exchange, Fill, MarketOrder, OrderSide, Portfolio};

/// Which side of the pair the scheme currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Cash,
    Asset,
}

impl PositionSide {
    /// Signed exposure used by position-based rewards
    pub fn direction(&self) -> f64 {
        match self {
            PositionSide::Cash => -1.0,
            PositionSide::Asset => 1.0,
        }
    }
}

/// Everything an action needs to execute at the current step
pub struct ActionCtx<'a> {
    pub exchange: &'a Exchange,
    pub portfolio: &'a mut Portfolio,
    pub step: usize,
}

/// Maps a discrete action index to (possibly) an order
pub trait ActionScheme {
    /// Size of the discrete action space
    fn action_count(&self) -> usize;

    /// Apply one action; returns the fill if an order executed
    fn apply(&mut self, action: usize, ctx: &mut ActionCtx<'_>) -> Result<Option<Fill>>;

    /// Current side, for reward schemes keyed on position
    fn position(&self) -> PositionSide;

    /// Restore pre-episode state
    fn reset(&mut self);
}

/// Buy/sell/hold: action 0 means "be in cash", 1 means "be in the asset".
/// Repeating the current side holds; flipping trades the whole balance
/// (scaled by `trade_fraction` from the `actions` config).
#[derive(Debug)]
pub struct Bsh {
    asset: Instrument,
    trade_fraction: Decimal,
    position: PositionSide,
}

impl Component for Bsh {
    const CATEGORY: &'static str = "actions";
}

impl Bsh {
    /// Construct inside an active trading context; the `actions` slice is
    /// resolved once, here.
    pub fn new(asset: Instrument) -> Result<Self> {
        let cfg = Self::resolve()?;
        Ok(Self {
            asset,
            trade_fraction: cfg.get_or("trade_fraction", dec!(1.0)),
            position: PositionSide::Cash,
        })
    }
}

impl ActionScheme for Bsh {
    fn action_count(&self) -> usize {
        2
    }

    fn apply(&mut self, action: usize, ctx: &mut ActionCtx<'_>) -> Result<Option<Fill>> {
        let target = if action == 0 {
            PositionSide::Cash
        } else {
            PositionSide::Asset
        };
        if target == self.position {
            return Ok(None);
        }

        let order = match target {
            PositionSide::Asset => {
                let base = ctx.portfolio.base_instrument();
                let notional = ctx.portfolio.balance(base) * self.trade_fraction;
                if notional <= Decimal::ZERO {
                    // Nothing to deploy; stay where we are
                    return Ok(None);
                }
                MarketOrder {
                    side: OrderSide::Buy,
                    size: base.amount(notional).amount,
                }
            }
            PositionSide::Cash => {
                let quantity = ctx.portfolio.balance(self.asset);
                if quantity <= Decimal::ZERO {
                    return Ok(None);
                }
                MarketOrder {
                    side: OrderSide::Sell,
                    size: quantity,
                }
            }
        };

        let fill = execute_order(&order, ctx.exchange, ctx.portfolio, self.asset, ctx.step)?;
        self.position = target;
        Ok(Some(fill))
    }

    fn position(&self) -> PositionSide {
        self.position
    }

    fn reset(&mut self) {
        self.position = PositionSide::Cash;
    }
}
