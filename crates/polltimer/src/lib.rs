pub mod clock;
pub mod config;
pub mod error;
pub mod jitter;
pub mod poller;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::PollConfig;
pub use error::{ConfigError, PollError, PollFailure};
pub use jitter::DEFAULT_JITTER_FACTOR;
pub use poller::{poll_async, poll_blocking, poll_blocking_with, PollStatus, Polled};
pub use timer::{PollTimer, PollTimerBuilder, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
