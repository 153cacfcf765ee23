// src/watch/listener.rs

use std::panic::{self, AssertUnwindSafe};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::watch::state::ResourceChange;

/// Receives change notifications on the polling task.
///
/// Listeners run synchronously, so a slow listener delays the next tick.
/// Errors and panics are logged and otherwise ignored.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, change: &ResourceChange) -> anyhow::Result<()>;
}

pub(crate) struct FnListener<F>(pub(crate) F);

impl<F> ChangeListener for FnListener<F>
where
    F: Fn(&ResourceChange) -> anyhow::Result<()> + Send + Sync,
{
    fn on_change(&self, change: &ResourceChange) -> anyhow::Result<()> {
        (self.0)(change)
    }
}

/// Invoke every listener in registration order. One failing listener does
/// not keep the others from running; a stop request does.
pub(crate) fn dispatch(
    listeners: &[Box<dyn ChangeListener>],
    change: &ResourceChange,
    token: &CancellationToken,
) {
    for (index, listener) in listeners.iter().enumerate() {
        if token.is_cancelled() {
            debug!(
                location = %change.location,
                skipped = listeners.len() - index,
                "stop requested; remaining listeners not notified"
            );
            return;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| listener.on_change(change))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(
                    location = %change.location,
                    listener = index,
                    error = %format!("{err:#}"),
                    "change listener failed"
                );
            }
            Err(_) => {
                warn!(
                    location = %change.location,
                    listener = index,
                    "change listener panicked"
                );
            }
        }
    }
}
