//! Trading Environment
//!
//! Gym-style interface over the feed, exchange, and portfolio: `reset`,
//! `step`, and a sampleable discrete action space.

mod actions;
mod rewards;

pub use actions::{ActionCtx, ActionScheme, Bsh, PositionSide};
pub use rewards::{PositionReturns, RewardCtx, RewardScheme};

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Result, TradeframeError};
use crate::feed::DataFeed;
use crate::instruments::{Instrument, Quantity};
use crate::oms::{Exchange, Portfolio};

/// Discrete action space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    n: usize,
}

impl ActionSpace {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn contains(&self, action: usize) -> bool {
        action < self.n
    }

    /// Uniform random action
    pub fn sample(&self) -> usize {
        rand::thread_rng().gen_range(0..self.n)
    }
}

/// Per-step bookkeeping returned alongside observations
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeInfo {
    /// Steps taken this episode
    pub step: usize,
    /// Portfolio value at the current quote, in base units
    pub net_worth: f64,
    /// Orders filled this episode
    pub num_trades: usize,
}

/// Result of taking one step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub observation: Vec<f64>,
    pub reward: f64,
    /// Episode ended because the feed ran out
    pub terminated: bool,
    /// Episode ended because `max_steps` was hit
    pub truncated: bool,
    pub info: EpisodeInfo,
}

/// Wiring for [`TradingEnv::create`]
pub struct EnvParams {
    pub feed: DataFeed,
    pub exchange: Exchange,
    pub portfolio: Portfolio,
    /// Instrument traded against the portfolio's base
    pub asset: Instrument,
    pub action_scheme: Box<dyn ActionScheme>,
    pub reward_scheme: Box<dyn RewardScheme>,
    /// Truncation bound; None runs the feed to exhaustion
    pub max_steps: Option<usize>,
}

/// Gym-style trading environment over a simulated exchange
pub struct TradingEnv {
    feed: DataFeed,
    exchange: Exchange,
    portfolio: Portfolio,
    asset: Instrument,
    actions: Box<dyn ActionScheme>,
    rewards: Box<dyn RewardScheme>,
    max_steps: Option<usize>,
    initial_balances: Vec<Quantity>,
    step_count: usize,
    num_trades: usize,
    started: bool,
}

impl TradingEnv {
    /// Wire an environment. Injectable schemes must already be constructed
    /// (inside a trading context); `create` itself needs no active scope.
    pub fn create(params: EnvParams) -> Result<Self> {
        let EnvParams {
            feed,
            exchange,
            portfolio,
            asset,
            action_scheme,
            reward_scheme,
            max_steps,
        } = params;

        if feed.remaining() == 0 {
            return Err(TradeframeError::Validation("feed is empty".to_string()));
        }
        let base = portfolio.base_instrument();
        if portfolio.wallet(base).is_none() {
            return Err(TradeframeError::Validation(format!(
                "portfolio has no wallet for base instrument {base}"
            )));
        }
        if portfolio.wallet(asset).is_none() {
            return Err(TradeframeError::Validation(format!(
                "portfolio has no wallet for asset instrument {asset}"
            )));
        }

        let initial_balances = portfolio.snapshot();
        Ok(Self {
            feed,
            exchange,
            portfolio,
            asset,
            actions: action_scheme,
            rewards: reward_scheme,
            max_steps,
            initial_balances,
            step_count: 0,
            num_trades: 0,
            started: false,
        })
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace {
            n: self.actions.action_count(),
        }
    }

    /// Number of values per observation row
    pub fn observation_width(&self) -> usize {
        self.feed.names().len()
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Instrument traded against the portfolio's base
    pub fn asset(&self) -> Instrument {
        self.asset
    }

    /// Portfolio value at the current quote, in base units
    pub fn net_worth(&self) -> f64 {
        let step = self.feed.last_index().unwrap_or(0);
        let price = self.exchange.quote(step).unwrap_or(Decimal::ZERO);
        self.portfolio.net_worth(price).to_f64().unwrap_or(0.0)
    }

    /// Start a new episode; yields the first observation
    pub fn reset(&mut self) -> Result<(Vec<f64>, EpisodeInfo)> {
        self.feed.reset();
        self.portfolio.restore(&self.initial_balances);
        self.actions.reset();
        self.rewards.reset();
        self.step_count = 0;
        self.num_trades = 0;
        self.started = true;

        let observation = self.feed.next().ok_or(TradeframeError::FeedExhausted)?;
        debug!(width = observation.len(), "environment reset");
        Ok((observation, self.info()))
    }

    /// Apply one action at the current quote, advance the feed, and score
    /// the step. Calling after the episode ended is an error.
    pub fn step(&mut self, action: usize) -> Result<StepOutcome> {
        if !self.started {
            return Err(TradeframeError::Internal(
                "step called on an inactive episode; call reset first".to_string(),
            ));
        }
        let space = self.action_space();
        if !space.contains(action) {
            return Err(TradeframeError::Validation(format!(
                "action {action} outside space of size {}",
                space.n()
            )));
        }
        let current = self
            .feed
            .last_index()
            .ok_or(TradeframeError::FeedExhausted)?;
        let prev_price = self.exchange.stream().at(current)?;

        let fill = {
            let mut ctx = ActionCtx {
                exchange: &self.exchange,
                portfolio: &mut self.portfolio,
                step: current,
            };
            self.actions.apply(action, &mut ctx)?
        };
        if fill.is_some() {
            self.num_trades += 1;
        }

        self.step_count += 1;

        let (observation, price, terminated) = match self.feed.next() {
            Some(row) => {
                let idx = self
                    .feed
                    .last_index()
                    .ok_or(TradeframeError::FeedExhausted)?;
                (row, self.exchange.stream().at(idx)?, false)
            }
            // Feed exhausted: repeat the final row as the terminal observation
            None => {
                let row = self.feed.row_at(current).unwrap_or_default();
                (row, prev_price, true)
            }
        };

        let reward = self.rewards.reward(&RewardCtx {
            price,
            prev_price,
            position: self.actions.position(),
            net_worth: self.net_worth(),
        });

        let truncated = !terminated
            && self
                .max_steps
                .is_some_and(|max| self.step_count >= max);
        if terminated || truncated {
            self.started = false;
        }

        Ok(StepOutcome {
            observation,
            reward,
            terminated,
            truncated,
            info: self.info(),
        })
    }

    fn info(&self) -> EpisodeInfo {
        EpisodeInfo {
            step: self.step_count,
            net_worth: self.net_worth(),
            num_trades: self.num_trades,
        }
    }
}
