use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tradeframe")]
#[command(version = "0.1.0")]
#[command(about = "Scoped-configuration trading simulation framework", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one demonstration episode with random actions
    Run {
        /// Override the number of series steps
        #[arg(long)]
        steps: Option<usize>,
        /// Override the series RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Preview the synthetic price feed
    Feed {
        /// Number of rows to print
        #[arg(long, default_value = "10")]
        rows: usize,
    },
}
