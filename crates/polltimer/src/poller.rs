//! Drivers that pair a probe with a [`PollTimer`] and do the actual sleeping.

use std::future::Future;
use std::time::Duration;

use rand::RngCore;

use crate::clock::Clock;
use crate::error::{PollError, PollFailure};
use crate::timer::PollTimer;

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T> {
    Ready(T),
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled<T> {
    pub value: T,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Probes until it reports [`PollStatus::Ready`], sleeping the current thread
/// between attempts.
pub fn poll_blocking<C, R, T, E, F>(
    timer: &mut PollTimer<C, R>,
    probe: F,
) -> Result<Polled<T>, PollFailure<E>>
where
    C: Clock,
    R: RngCore,
    F: FnMut() -> Result<PollStatus<T>, E>,
{
    poll_blocking_with(timer, std::thread::sleep, probe)
}

/// Like [`poll_blocking`], with the sleep supplied by the caller.
pub fn poll_blocking_with<C, R, T, E, S, F>(
    timer: &mut PollTimer<C, R>,
    mut sleep: S,
    mut probe: F,
) -> Result<Polled<T>, PollFailure<E>>
where
    C: Clock,
    R: RngCore,
    S: FnMut(Duration),
    F: FnMut() -> Result<PollStatus<T>, E>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if let PollStatus::Ready(value) = probe().map_err(PollFailure::Probe)? {
            return Ok(finish(timer, value, attempts));
        }
        let pause = next_pause(timer, attempts)?;
        sleep(pause);
    }
}

/// Async variant of [`poll_blocking`] sleeping on the tokio timer.
///
/// Dropping the returned future cancels the loop.
pub async fn poll_async<C, R, T, E, F, Fut>(
    timer: &mut PollTimer<C, R>,
    mut probe: F,
) -> Result<Polled<T>, PollFailure<E>>
where
    C: Clock,
    R: RngCore,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStatus<T>, E>>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if let PollStatus::Ready(value) = probe().await.map_err(PollFailure::Probe)? {
            return Ok(finish(timer, value, attempts));
        }
        let pause = next_pause(timer, attempts)?;
        tokio::time::sleep(pause).await;
    }
}

fn next_pause<C: Clock, R: RngCore>(
    timer: &mut PollTimer<C, R>,
    attempt: u32,
) -> Result<Duration, PollError> {
    match timer.sleep_interval() {
        Ok(pause) => {
            tracing::debug!(
                target: "polltimer",
                attempt,
                pause_us = pause.as_micros() as u64,
                "probe pending"
            );
            Ok(pause)
        }
        Err(error) => {
            tracing::warn!(target: "polltimer", attempt, error = %error, "giving up");
            Err(error)
        }
    }
}

fn finish<C: Clock, R, T>(timer: &PollTimer<C, R>, value: T, attempts: u32) -> Polled<T> {
    let elapsed = timer.elapsed();
    tracing::info!(
        target: "polltimer",
        attempts,
        elapsed_ms = elapsed.as_millis() as u64,
        "poll completed"
    );
    Polled {
        value,
        attempts,
        elapsed,
    }
}
