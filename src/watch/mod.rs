// src/watch/mod.rs

//! Resource change watching.
//!
//! This module is responsible for:
//! - Probing a resource at construction, retrying transient access failures
//!   within a fixed budget ([`probe`]).
//! - Polling it afterwards on a cancellable Tokio task ([`poller`]).
//! - Deciding what counts as a change ([`state`]) and telling listeners
//!   about it ([`listener`]).
//!
//! It does **not** know how a resource is reached; that is the job of
//! [`crate::resource`].

use std::time::Duration;

use crate::errors::{ReswatchError, Result};

pub mod listener;
pub mod poller;
pub mod probe;
pub mod state;
pub mod watcher;

pub use listener::ChangeListener;
pub use probe::{observe, probe};
pub use state::{detect_change, ChangeKind, ResourceChange, ResourceState, Transition};
pub use watcher::{ResourceWatcher, StopHandle, WatcherHandle};

/// Poll interval used when none is configured: twelve hours.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);

/// Retry budget used when none is configured: a single probe attempt.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 0;

/// Schedule adjustment after failed poll ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollFailurePolicy {
    /// Keep polling at the base interval.
    #[default]
    Tolerate,
    /// Double the delay after each consecutive failure, never exceeding
    /// `max_interval`. A successful tick restores the base interval.
    Backoff { max_interval: Duration },
}

impl PollFailurePolicy {
    /// Delay before the next tick, given how many ticks in a row have failed.
    pub fn next_delay(&self, base: Duration, consecutive_failures: u32) -> Duration {
        match *self {
            PollFailurePolicy::Tolerate => base,
            PollFailurePolicy::Backoff { max_interval } => {
                let factor = 1u32.checked_shl(consecutive_failures).unwrap_or(u32::MAX);
                base.saturating_mul(factor).min(max_interval.max(base))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Time between poll ticks. Must be greater than zero.
    pub poll_interval: Duration,
    /// Additional existence checks made at construction after the first
    /// one fails.
    pub retry_attempts: u32,
    pub failure_policy: PollFailurePolicy,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            failure_policy: PollFailurePolicy::Tolerate,
        }
    }
}

impl WatchOptions {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ReswatchError::InvalidArgument(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
