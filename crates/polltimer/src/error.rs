use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Raised by [`PollTimer::sleep_interval`](crate::PollTimer::sleep_interval)
/// once the polling budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("polling timed out after {:.3} seconds", .elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },
}

impl PollError {
    pub fn elapsed(&self) -> Duration {
        match self {
            PollError::Timeout { elapsed } => *elapsed,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read poll config {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid poll config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Why a poll loop gave up: either the timer ran out or the probe itself failed.
#[derive(Debug, Error)]
pub enum PollFailure<E> {
    #[error(transparent)]
    Timer(#[from] PollError),
    #[error("poll probe failed: {0}")]
    Probe(E),
}

impl<E> PollFailure<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PollFailure::Timer(PollError::Timeout { .. }))
    }
}
