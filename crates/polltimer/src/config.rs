use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::jitter::DEFAULT_JITTER_FACTOR;
use crate::timer::{PollTimer, PollTimerBuilder};

/// Serializable form of the three timer options.
///
/// ```toml
/// timeout_ms = 30000
/// interval_ms = 250
/// jitter_factor = 0.2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    pub jitter_factor: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            interval_ms: None,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl PollConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(target: "polltimer", path = ?path, ?config, "loaded poll config");
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }

    /// Builder preloaded with these options; clock and RNG can still be swapped.
    pub fn builder(&self) -> PollTimerBuilder {
        let mut builder = PollTimer::builder().jitter_factor(self.jitter_factor);
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(interval) = self.interval() {
            builder = builder.interval(interval);
        }
        builder
    }

    pub fn start(&self) -> PollTimer {
        self.builder().start()
    }
}
