// src/watch/watcher.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{ReswatchError, Result};
use crate::resource::Resource;
use crate::watch::listener::{ChangeListener, FnListener};
use crate::watch::poller::Poller;
use crate::watch::probe::probe;
use crate::watch::state::{ResourceChange, ResourceState};
use crate::watch::{PollFailurePolicy, WatchOptions};

/// An armed watcher: the initial probe succeeded and the resource's state
/// is known.
///
/// Construction is blocking. Async callers should build watchers inside
/// `tokio::task::spawn_blocking`. Nothing polls until [`start`] is called.
///
/// [`start`]: ResourceWatcher::start
pub struct ResourceWatcher {
    resource: Arc<dyn Resource>,
    options: WatchOptions,
    state: ResourceState,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl fmt::Debug for ResourceWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceWatcher")
            .field("location", &self.resource.location())
            .field("options", &self.options)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ResourceWatcher {
    /// Probe `resource`, retrying access failures up to `retry_attempts`
    /// times, and arm a watcher that will poll every `poll_interval`.
    pub fn new(
        resource: Arc<dyn Resource>,
        poll_interval: Duration,
        retry_attempts: u32,
    ) -> Result<Self> {
        Self::with_options(
            resource,
            WatchOptions {
                poll_interval,
                retry_attempts,
                failure_policy: PollFailurePolicy::Tolerate,
            },
        )
    }

    pub fn with_options(resource: Arc<dyn Resource>, options: WatchOptions) -> Result<Self> {
        options.validate()?;

        let state = probe(resource.as_ref(), options.retry_attempts)?;
        info!(
            location = %resource.location(),
            exists = state.exists,
            last_modified = ?state.last_modified,
            "resource watcher armed"
        );

        Ok(Self {
            resource,
            options,
            state,
            listeners: Vec::new(),
        })
    }

    pub fn resource(&self) -> &Arc<dyn Resource> {
        &self.resource
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Last-known state as established by the initial probe.
    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn add_listener(&mut self, listener: impl ChangeListener + 'static) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Register a closure as a listener.
    pub fn on_change<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&ResourceChange) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_listener(FnListener(f))
    }

    /// Spawn the polling task on the current Tokio runtime.
    ///
    /// The first tick happens one poll interval from now.
    pub fn start(self) -> Result<WatcherHandle> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            ReswatchError::Other(anyhow!("starting a resource watcher needs a Tokio runtime: {e}"))
        })?;

        let location = self.resource.location().to_string();
        let token = CancellationToken::new();
        let poller = Poller {
            resource: self.resource,
            options: self.options,
            state: self.state,
            listeners: self.listeners,
        };
        let task = runtime.spawn(poller.run(token.clone()));

        Ok(WatcherHandle {
            location,
            token,
            task: Some(task),
        })
    }
}

/// Handle to a running watcher.
///
/// Dropping the handle stops the watcher.
pub struct WatcherHandle {
    location: String,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("location", &self.location)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl WatcherHandle {
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Ask the polling task to exit. A tick already in progress finishes,
    /// but its change (if any) is not dispatched. Calling this again is a
    /// no-op.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            info!(location = %self.location, "stopping resource watcher");
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cloneable handle that can stop this watcher from any task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.token.clone(),
        }
    }

    /// True once the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Stop the watcher and wait for the polling task to exit.
    pub async fn shutdown(self) {
        self.stop();
        self.join().await;
    }

    /// Wait for the polling task to exit without asking it to.
    ///
    /// Returns once some other party stops the watcher (e.g. through a
    /// [`StopHandle`]).
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(location = %self.location, error = %err, "resource poller ended abnormally");
            }
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
