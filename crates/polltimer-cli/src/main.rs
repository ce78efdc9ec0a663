use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use polltimer::{poll_async, ManualClock, PollConfig, PollStatus};
use serde::Serialize;

mod cli;
use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("POLLTIMER_LOG").unwrap_or_else(|_| "polltimer=info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.timer.resolve()?;

    tracing::debug!(target: "polltimer", version = env!("CARGO_PKG_VERSION"), ?config, "polltimer starting");

    match args.command {
        cli::Command::Plan {
            probe_ms,
            seed,
            json,
            max_steps,
        } => plan(&config, Duration::from_millis(probe_ms), seed, max_steps, json),
        cli::Command::Wait { command } => wait(&config, &command).await,
    }
}

#[derive(Debug, Serialize)]
struct PlanStep {
    attempt: u32,
    elapsed_ms: f64,
    sleep_ms: f64,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    steps: Vec<PlanStep>,
    timed_out_after_ms: Option<f64>,
    truncated: bool,
}

fn millis(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1_000.0
}

fn plan(config: &PollConfig, probe: Duration, seed: Option<u64>, max_steps: usize, json: bool) -> Result<()> {
    let clock = ManualClock::new();
    let builder = config.builder().clock(clock.clone());
    let mut timer = match seed {
        Some(seed) => builder.seed(seed).start(),
        None => builder.start(),
    };

    let mut steps = Vec::new();
    let mut timed_out_after = None;
    let mut attempt: u32 = 0;
    while steps.len() < max_steps {
        attempt = attempt.saturating_add(1);
        clock.advance(probe);
        match timer.sleep_interval() {
            Ok(sleep) => {
                steps.push(PlanStep {
                    attempt,
                    elapsed_ms: millis(timer.elapsed()),
                    sleep_ms: millis(sleep),
                });
                clock.advance(sleep);
            }
            Err(error) => {
                timed_out_after = Some(error.elapsed());
                break;
            }
        }
    }

    let report = PlanReport {
        truncated: timed_out_after.is_none(),
        timed_out_after_ms: timed_out_after.map(millis),
        steps,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:>8} {:>12} {:>10}", "attempt", "elapsed_ms", "sleep_ms");
    for step in &report.steps {
        println!("{:>8} {:>12.3} {:>10.3}", step.attempt, step.elapsed_ms, step.sleep_ms);
    }
    match report.timed_out_after_ms {
        Some(elapsed_ms) => println!("timed out after {elapsed_ms:.3} ms"),
        None => println!("stopped after {max_steps} steps"),
    }
    Ok(())
}

async fn wait(config: &PollConfig, command: &[String]) -> Result<()> {
    let (program, args) = command.split_first().context("no command given")?;
    let mut timer = config.start();

    tracing::info!(target: "polltimer", program = %program, "waiting for command to succeed");

    let polled = poll_async(&mut timer, || {
        let mut probe = tokio::process::Command::new(program);
        probe.args(args).stdin(Stdio::null());
        async move {
            let status = probe.status().await?;
            tracing::debug!(target: "polltimer", %status, "probe exited");
            Ok::<_, std::io::Error>(if status.success() {
                PollStatus::Ready(status)
            } else {
                PollStatus::Pending
            })
        }
    })
    .await
    .with_context(|| format!("waiting for `{}`", command.join(" ")))?;

    tracing::info!(
        target: "polltimer",
        attempts = polled.attempts,
        elapsed_ms = polled.elapsed.as_millis() as u64,
        "command succeeded"
    );
    Ok(())
}
