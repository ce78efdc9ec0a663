use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polltimer::PollConfig;

#[derive(Debug, Parser)]
#[command(name = "polltimer", version, about = "Deadline-bounded polling with jittered intervals")]
pub struct Args {
    #[command(flatten)]
    pub timer: TimerArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Args)]
pub struct TimerArgs {
    /// TOML file with `timeout_ms`, `interval_ms` and `jitter_factor`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, env = "POLLTIMER_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
    #[arg(long, global = true, env = "POLLTIMER_INTERVAL_MS")]
    pub interval_ms: Option<u64>,
    /// Fraction of the interval to randomize by, clamped to [0, 1].
    #[arg(long = "jitter", global = true, env = "POLLTIMER_JITTER", allow_negative_numbers = true)]
    pub jitter_factor: Option<f64>,
}

impl TimerArgs {
    /// Config file first, then flags and environment on top.
    pub fn resolve(&self) -> Result<PollConfig> {
        let mut config = match &self.config {
            Some(path) => PollConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PollConfig::default(),
        };
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = Some(timeout_ms);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = Some(interval_ms);
        }
        if let Some(jitter_factor) = self.jitter_factor {
            config.jitter_factor = jitter_factor;
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the sleep schedule a timer would produce, using simulated time.
    Plan {
        /// Simulated duration of each poll request.
        #[arg(long, default_value_t = 1)]
        probe_ms: u64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = false)]
        json: bool,
        #[arg(long, default_value_t = 100_000)]
        max_steps: usize,
    },
    /// Re-run a command until it exits successfully or the timeout passes.
    Wait {
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<String>,
    },
}
