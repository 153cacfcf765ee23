// src/watch/poller.rs

//! The background polling task.

use std::sync::Arc;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{ReswatchError, Result};
use crate::resource::Resource;
use crate::watch::listener::{dispatch, ChangeListener};
use crate::watch::probe::observe;
use crate::watch::state::{detect_change, ResourceChange, ResourceState, Transition};
use crate::watch::WatchOptions;

/// State owned by the polling task. Moving it into the task is what makes
/// the task the only writer of the last-known state.
pub(crate) struct Poller {
    pub(crate) resource: Arc<dyn Resource>,
    pub(crate) options: WatchOptions,
    pub(crate) state: ResourceState,
    pub(crate) listeners: Vec<Box<dyn ChangeListener>>,
}

impl Poller {
    pub(crate) async fn run(mut self, token: CancellationToken) {
        let location = self.resource.location().to_string();
        info!(
            %location,
            interval = ?self.options.poll_interval,
            policy = ?self.options.failure_policy,
            "resource poller started"
        );

        let mut consecutive_failures: u32 = 0;

        loop {
            let delay = self
                .options
                .failure_policy
                .next_delay(self.options.poll_interval, consecutive_failures);

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            match self.observe().await {
                Ok(observed) => {
                    consecutive_failures = 0;
                    self.apply(&location, observed, &token);
                }
                Err(err) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    warn!(
                        %location,
                        consecutive_failures,
                        error = %err,
                        "poll failed; keeping last known state"
                    );
                }
            }
        }

        info!(%location, "resource poller stopped");
    }

    /// Run one observation on the blocking pool.
    async fn observe(&self) -> Result<ResourceState> {
        let resource = Arc::clone(&self.resource);
        match tokio::task::spawn_blocking(move || observe(resource.as_ref())).await {
            Ok(result) => result,
            Err(join_err) => Err(ReswatchError::Other(anyhow!(
                "resource poll panicked or was cancelled: {join_err}"
            ))),
        }
    }

    fn apply(&mut self, location: &str, observed: ResourceState, token: &CancellationToken) {
        match detect_change(&self.state, &observed) {
            Transition::Unchanged => {
                debug!(%location, "poll: no change");
            }
            Transition::Baseline => {
                debug!(%location, "poll: recorded modification time for resource of unknown age");
                self.state = observed;
            }
            Transition::Changed(kind) => {
                self.state = observed;

                if token.is_cancelled() {
                    debug!(%location, %kind, "stop requested; change not dispatched");
                    return;
                }

                info!(%location, %kind, "resource changed");
                let change = ResourceChange {
                    location: location.to_string(),
                    kind,
                    state: observed,
                };
                dispatch(&self.listeners, &change, token);
            }
        }
    }
}
