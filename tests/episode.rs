//! End-to-end episode: synthetic feed, simulated exchange, wallets, and a
//! context-configured environment stepped with random actions.

use rust_decimal_macros::dec;
use serde_json::json;

use tradeframe::env::{Bsh, EnvParams, PositionReturns, TradingEnv};
use tradeframe::feed::{DataFeed, PriceSeries, PriceStream, SeriesConfig};
use tradeframe::instruments::{BTC, USD};
use tradeframe::oms::{Exchange, Portfolio, Wallet};
use tradeframe::TradingContext;

// The context stack is process-wide; serialize the tests that depend on
// whether a scope is active.
static CONTEXT_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn build_env(steps: usize, seed: u64) -> TradingEnv {
    let series = PriceSeries::synthetic(&SeriesConfig {
        steps,
        seed,
        ..SeriesConfig::default()
    });

    let price_stream = PriceStream::from_series(&series).rename("USD-BTC");
    let exchange = Exchange::new("coinbase", price_stream.clone());

    let portfolio = Portfolio::new(
        USD,
        vec![
            Wallet::new(&exchange, USD.amount(dec!(10_000))),
            Wallet::new(&exchange, BTC.zero()),
        ],
    );

    let lock = CONTEXT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    let guard = TradingContext::enter(json!({
        "actions": { "trade_fraction": 1.0 },
        "rewards": { "scale": 1.0 },
        "shared": {
            "base_currency": "USD",
            "base_precision": 2,
            "instrument_precision": 8
        }
    }))
    .unwrap();

    let env = TradingEnv::create(EnvParams {
        feed: DataFeed::new(vec![price_stream]),
        exchange,
        portfolio,
        asset: BTC,
        action_scheme: Box::new(Bsh::new(BTC).unwrap()),
        reward_scheme: Box::new(PositionReturns::new().unwrap()),
        max_steps: None,
    })
    .unwrap();

    guard.exit();
    drop(lock);
    env
}

#[test]
fn random_episode_runs_feed_to_exhaustion() {
    let mut env = build_env(200, 42);
    let space = env.action_space();
    assert_eq!(space.n(), 2);

    let (observation, info) = env.reset().unwrap();
    assert_eq!(observation.len(), 1);
    assert!((info.net_worth - 10_000.0).abs() < 1e-6);

    let mut steps = 0;
    let mut total_reward = 0.0;
    loop {
        let outcome = env.step(space.sample()).unwrap();
        steps += 1;
        total_reward += outcome.reward;
        assert!(outcome.reward.is_finite());
        assert!(outcome.info.net_worth > 0.0);

        if outcome.terminated || outcome.truncated {
            assert!(outcome.terminated, "feed exhaustion should terminate");
            break;
        }
        assert!(steps <= 200, "episode must end within the series length");
    }

    assert_eq!(steps, 200);
    assert!(total_reward.is_finite());
    // Commissions can shrink the portfolio but balances never go negative
    let net_worth = env.net_worth();
    assert!(net_worth > 0.0);
}

#[test]
fn context_commission_reaches_fills() {
    let lock = CONTEXT_LOCK.lock().unwrap_or_else(|p| p.into_inner());

    let price_stream = PriceStream::source(vec![100.0, 100.0]).rename("USD-BTC");

    // Same wiring as the binary: the exchange resolves its options from
    // the entered context, alongside the schemes
    let guard = TradingContext::enter(json!({
        "actions": {},
        "rewards": {},
        "exchanges": { "commission": 0.5 }
    }))
    .unwrap();

    let exchange = Exchange::from_context("coinbase", price_stream.clone()).unwrap();
    let portfolio = Portfolio::new(
        USD,
        vec![
            Wallet::new(&exchange, USD.amount(dec!(10_000))),
            Wallet::new(&exchange, BTC.zero()),
        ],
    );

    let mut env = TradingEnv::create(EnvParams {
        feed: DataFeed::new(vec![price_stream]),
        exchange,
        portfolio,
        asset: BTC,
        action_scheme: Box::new(Bsh::new(BTC).unwrap()),
        reward_scheme: Box::new(PositionReturns::new().unwrap()),
        max_steps: None,
    })
    .unwrap();

    guard.exit();
    drop(lock);

    env.reset().unwrap();
    let outcome = env.step(1).unwrap();

    // 10000 USD at price 100 with 50% commission buys 50 BTC, not ~99.75
    assert_eq!(outcome.info.num_trades, 1);
    assert_eq!(env.portfolio().balance(BTC), dec!(50));
    assert_eq!(env.portfolio().balance(USD), dec!(0));
}

#[test]
fn scheme_construction_outside_context_fails() {
    let _lock = CONTEXT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    assert!(Bsh::new(BTC).is_err());
    assert!(PositionReturns::new().is_err());
}

#[test]
fn episode_is_repeatable_after_reset() {
    let mut env = build_env(64, 7);

    env.reset().unwrap();
    let mut first = Vec::new();
    loop {
        // Always-hold policy is deterministic
        let outcome = env.step(0).unwrap();
        first.push(outcome.observation.clone());
        if outcome.terminated || outcome.truncated {
            break;
        }
    }

    env.reset().unwrap();
    let mut second = Vec::new();
    loop {
        let outcome = env.step(0).unwrap();
        second.push(outcome.observation.clone());
        if outcome.terminated || outcome.truncated {
            break;
        }
    }

    assert_eq!(first, second);
}
