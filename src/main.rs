use clap::Parser;
use rust_decimal::prelude::ToPrimitive;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tradeframe::cli::{Cli, Commands};
use tradeframe::config::AppConfig;
use tradeframe::env::{Bsh, EnvParams, PositionReturns, TradingEnv};
use tradeframe::error::{Result, TradeframeError};
use tradeframe::feed::{DataFeed, PriceSeries, PriceStream};
use tradeframe::instruments::{BTC, USD};
use tradeframe::oms::{Exchange, Portfolio, Wallet};
use tradeframe::TradingContext;

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // No usable config; log the failure at the stock level
            init_logging("debug");
            error!("Error running example: {e}");
            std::process::exit(1);
        }
    };
    init_logging(&config.logging.level);

    if let Err(e) = dispatch(&cli, config) {
        error!("Error running example: {e}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(Some(path))?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

fn dispatch(cli: &Cli, mut config: AppConfig) -> Result<()> {
    match &cli.command {
        Some(Commands::Run { steps, seed }) => {
            if let Some(steps) = steps {
                config.series.steps = *steps;
            }
            if let Some(seed) = seed {
                config.series.seed = *seed;
            }
            run_episode(&config)
        }
        Some(Commands::Feed { rows }) => preview_feed(&config, *rows),
        None => run_episode(&config),
    }
}

/// `level` (from `logging.level`) drives the crate's verbosity unless
/// `RUST_LOG` overrides the whole filter
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,tradeframe={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Print the first rows of the synthetic series
fn preview_feed(config: &AppConfig, rows: usize) -> Result<()> {
    validate(config)?;
    let series = PriceSeries::synthetic(&config.series);

    println!("{:<22} {:>12}", "timestamp", "close");
    for point in series.points().iter().take(rows) {
        println!(
            "{:<22} {:>12.2}",
            point.timestamp.format("%Y-%m-%d %H:%M"),
            point.close
        );
    }
    if let Some((lo, hi)) = series.close_range() {
        println!("{} rows, close range {lo:.2} - {hi:.2}", series.len());
    }
    Ok(())
}

/// Build the simulation and run one episode with random actions
fn run_episode(config: &AppConfig) -> Result<()> {
    validate(config)?;

    let series = PriceSeries::synthetic(&config.series);
    if let Some((lo, hi)) = series.close_range() {
        info!(
            "Generated {} price observations, close range {lo:.2} - {hi:.2}",
            series.len()
        );
    }

    let price_stream = PriceStream::from_series(&series).rename("USD-BTC");
    let feed = DataFeed::new(vec![price_stream.clone()]);

    // Exchange options and the schemes are injectable components: their
    // configuration resolves from the context entered here, once, at
    // construction.
    let mut env = {
        let guard = TradingContext::enter(config.context.clone())?;

        let exchange = Exchange::from_context("coinbase", price_stream)?;
        let cash = Wallet::new(&exchange, USD.amount(config.episode.initial_cash));
        let asset = Wallet::new(&exchange, BTC.zero());
        let portfolio = Portfolio::new(USD, vec![cash, asset]);

        let env = TradingEnv::create(EnvParams {
            feed,
            exchange,
            portfolio,
            asset: BTC,
            action_scheme: Box::new(Bsh::new(BTC)?),
            reward_scheme: Box::new(PositionReturns::new()?),
            max_steps: (config.episode.max_steps > 0).then_some(config.episode.max_steps),
        })?;
        guard.exit();
        env
    };

    let space = env.action_space();
    info!(
        "Environment ready: {} actions, observation width {}",
        space.n(),
        env.observation_width()
    );

    let (observation, _info) = env.reset()?;
    info!("Episode started with initial observation of {} values", observation.len());

    let mut total_reward = 0.0;
    let mut steps = 0usize;

    loop {
        let action = space.sample();
        let outcome = env.step(action)?;
        total_reward += outcome.reward;
        steps += 1;

        if steps % config.episode.log_every == 0 {
            info!(
                "Step {}: reward={:.4}, total_reward={:.4}, net_worth={:.2}",
                steps, outcome.reward, total_reward, outcome.info.net_worth
            );
        }

        if outcome.terminated || outcome.truncated {
            break;
        }
    }

    let net_worth = env.net_worth();
    let initial = config
        .episode
        .initial_cash
        .to_f64()
        .ok_or_else(|| TradeframeError::Internal("initial cash out of range".to_string()))?;

    info!(
        "Episode finished: {} steps, total_reward={:.4}, avg_reward={:.4}, net_worth={:.2}, pnl={:.2}",
        steps,
        total_reward,
        total_reward / steps.max(1) as f64,
        net_worth,
        net_worth - initial
    );

    Ok(())
}

fn validate(config: &AppConfig) -> Result<()> {
    config
        .validate()
        .map_err(|errors| TradeframeError::Validation(errors.join("; ")))
}
