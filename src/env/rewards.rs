//! Reward schemes
//!
//! The only scheme shipped is the position-based return the original demo
//! used: the per-step price return signed by the held position.

use super::actions::PositionSide;
use crate::context::Component;
use crate::error::Result;

/// Inputs available when scoring one step
#[derive(Debug, Clone, Copy)]
pub struct RewardCtx {
    /// Price after the step
    pub price: f64,
    /// Price before the step
    pub prev_price: f64,
    /// Side held through the step
    pub position: PositionSide,
    /// Portfolio value after the step, in base units
    pub net_worth: f64,
}

pub trait RewardScheme {
    /// Score one environment step
    fn reward(&mut self, ctx: &RewardCtx) -> f64;

    /// Restore pre-episode state
    fn reset(&mut self) {}
}

/// Position-based returns: `direction * (price - prev) / prev`, scaled by
/// the optional `scale` key of the `rewards` config.
#[derive(Debug)]
pub struct PositionReturns {
    scale: f64,
}

impl Component for PositionReturns {
    const CATEGORY: &'static str = "rewards";
}

impl PositionReturns {
    /// Construct inside an active trading context
    pub fn new() -> Result<Self> {
        let cfg = Self::resolve()?;
        Ok(Self {
            scale: cfg.get_or("scale", 1.0),
        })
    }
}

impl RewardScheme for PositionReturns {
    fn reward(&mut self, ctx: &RewardCtx) -> f64 {
        if ctx.prev_price <= 0.0 {
            return 0.0;
        }
        let ret = (ctx.price - ctx.prev_price) / ctx.prev_price;
        ctx.position.direction() * ret * self.scale
    }
}
