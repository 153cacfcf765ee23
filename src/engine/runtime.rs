// src/engine/runtime.rs

use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::watch::WatcherHandle;

use super::report::format_change;
use super::RuntimeEvent;

/// Owns every running watcher and reports their changes.
///
/// The loop ends on `ShutdownRequested`, when every sender is gone, or when
/// the report can no longer be written. In every case all watchers are
/// stopped and awaited before `run` returns.
pub struct Runtime<W: Write + Send> {
    event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    watchers: Vec<WatcherHandle>,
    out: W,
}

impl<W: Write + Send> fmt::Debug for Runtime<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("watchers", &self.watchers)
            .finish_non_exhaustive()
    }
}

impl<W: Write + Send> Runtime<W> {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
        watchers: Vec<WatcherHandle>,
        out: W,
    ) -> Self {
        Self {
            event_rx,
            watchers,
            out,
        }
    }

    /// Main event loop. Returns the writer so callers can inspect output.
    pub async fn run(mut self) -> Result<W> {
        info!(watchers = self.watchers.len(), "reswatch runtime started");

        let mut write_failure = None;
        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::ResourceChanged(change) => {
                    let written = writeln!(self.out, "{}", format_change(&change))
                        .and_then(|()| self.out.flush());
                    if let Err(e) = written {
                        error!(error = %e, "cannot write change report; stopping runtime");
                        write_failure = Some(e);
                        break;
                    }
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    break;
                }
            }
        }

        for watcher in self.watchers.drain(..) {
            watcher.shutdown().await;
        }

        if let Some(e) = write_failure {
            return Err(e.into());
        }

        info!("runtime exiting");
        Ok(self.out)
    }
}
