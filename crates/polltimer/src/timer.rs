use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::clock::{Clock, SystemClock};
use crate::error::PollError;
use crate::jitter::{self, DEFAULT_JITTER_FACTOR};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Keeps a client-side polling loop inside its overall timeout.
///
/// Polling has no persistent connection that could time out on its own, so the
/// timer measures elapsed time since construction and hands out jittered sleep
/// intervals until the budget is spent. It never sleeps itself.
///
/// ```no_run
/// use std::time::Duration;
/// use polltimer::PollTimer;
///
/// let mut timer = PollTimer::new(Some(Duration::from_secs(30)), None, 0.1);
/// loop {
///     // ... issue the status request ...
///     # let done = true;
///     if done {
///         break;
///     }
///     std::thread::sleep(timer.sleep_interval()?);
/// }
/// # Ok::<(), polltimer::PollError>(())
/// ```
pub struct PollTimer<C = SystemClock, R = StdRng> {
    start: Instant,
    timeout: Duration,
    interval: Duration,
    jitter_factor: f64,
    clock: C,
    rng: R,
}

impl PollTimer {
    /// Starts a timer on the system clock with an entropy-seeded RNG.
    ///
    /// Missing or zero durations fall back to [`DEFAULT_TIMEOUT`] and
    /// [`DEFAULT_INTERVAL`]; `jitter_factor` is clamped into `[0.0, 1.0]`.
    pub fn new(timeout: Option<Duration>, interval: Option<Duration>, jitter_factor: f64) -> Self {
        PollTimerBuilder {
            timeout,
            interval,
            ..PollTimerBuilder::new()
        }
        .jitter_factor(jitter_factor)
        .start()
    }

    pub fn builder() -> PollTimerBuilder {
        PollTimerBuilder::new()
    }
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_JITTER_FACTOR)
    }
}

impl<C: Clock, R: RngCore> PollTimer<C, R> {
    /// Returns how long to sleep before the next poll.
    ///
    /// Fails with [`PollError::Timeout`] once more than `timeout` has elapsed.
    /// The result is never longer than the remaining budget, so an elapsed
    /// time exactly equal to the timeout yields a zero-length sleep.
    pub fn sleep_interval(&mut self) -> Result<Duration, PollError> {
        let runtime = self.elapsed();
        if runtime > self.timeout {
            tracing::warn!(
                target: "polltimer",
                elapsed_ms = runtime.as_millis() as u64,
                timeout_ms = self.timeout.as_millis() as u64,
                "polling budget exhausted"
            );
            return Err(PollError::Timeout { elapsed: runtime });
        }

        let candidate = jitter::apply_jitter(self.interval, self.jitter_factor, &mut self.rng);
        let sleep = candidate.min(self.timeout - runtime);
        tracing::debug!(
            target: "polltimer",
            elapsed_ms = runtime.as_millis() as u64,
            sleep_us = sleep.as_micros() as u64,
            "next poll scheduled"
        );
        Ok(sleep)
    }
}

impl<C: Clock, R> PollTimer<C, R> {
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    /// Budget left before the timer fails, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.timeout
    }
}

impl<C, R> PollTimer<C, R> {
    pub fn started_at(&self) -> Instant {
        self.start
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn jitter_factor(&self) -> f64 {
        self.jitter_factor
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C, R> fmt::Debug for PollTimer<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollTimer")
            .field("start", &self.start)
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("jitter_factor", &self.jitter_factor)
            .finish_non_exhaustive()
    }
}

/// Configures a [`PollTimer`], including the clock and random source it uses.
pub struct PollTimerBuilder<C = SystemClock, R = StdRng> {
    timeout: Option<Duration>,
    interval: Option<Duration>,
    jitter_factor: f64,
    clock: C,
    rng: R,
}

impl PollTimerBuilder {
    pub fn new() -> Self {
        Self {
            timeout: None,
            interval: None,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            clock: SystemClock,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for PollTimerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, R> PollTimerBuilder<C, R> {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = jitter_factor;
        self
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> PollTimerBuilder<C2, R> {
        PollTimerBuilder {
            timeout: self.timeout,
            interval: self.interval,
            jitter_factor: self.jitter_factor,
            clock,
            rng: self.rng,
        }
    }

    pub fn rng<R2: RngCore>(self, rng: R2) -> PollTimerBuilder<C, R2> {
        PollTimerBuilder {
            timeout: self.timeout,
            interval: self.interval,
            jitter_factor: self.jitter_factor,
            clock: self.clock,
            rng,
        }
    }

    /// Uses a `StdRng` seeded from `seed`, making the jitter sequence reproducible.
    pub fn seed(self, seed: u64) -> PollTimerBuilder<C, StdRng> {
        self.rng(StdRng::seed_from_u64(seed))
    }
}

impl<C: Clock, R: RngCore> PollTimerBuilder<C, R> {
    /// Captures the clock's current instant as the timer's start.
    pub fn start(self) -> PollTimer<C, R> {
        let timer = PollTimer {
            start: self.clock.now(),
            timeout: non_zero_or(self.timeout, DEFAULT_TIMEOUT),
            interval: non_zero_or(self.interval, DEFAULT_INTERVAL),
            jitter_factor: jitter::clamp_jitter_factor(self.jitter_factor),
            clock: self.clock,
            rng: self.rng,
        };
        tracing::debug!(
            target: "polltimer",
            timeout_ms = timer.timeout.as_millis() as u64,
            interval_ms = timer.interval.as_millis() as u64,
            jitter_factor = timer.jitter_factor,
            "poll timer started"
        );
        timer
    }
}

// Zero counts as unset.
fn non_zero_or(value: Option<Duration>, fallback: Duration) -> Duration {
    value.filter(|duration| !duration.is_zero()).unwrap_or(fallback)
}
