// src/engine/mod.rs

//! Application runtime for reswatch.
//!
//! Watchers report changes from their own polling tasks; this module funnels
//! those reports, plus shutdown signals, through one channel into a single
//! loop that prints them and finally stops every watcher.

use crate::watch::ResourceChange;

/// Events flowing into the runtime from watchers and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A watched resource was created, updated or deleted.
    ResourceChanged(ResourceChange),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod report;
pub mod runtime;

pub use report::{format_change, format_state};
pub use runtime::Runtime;
