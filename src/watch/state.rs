// src/watch/state.rs

//! Observed resource state and the pure change-detection rule.
//!
//! Nothing here touches a resource, a clock or a task; the poller feeds
//! observations in and acts on the returned [`Transition`].

use std::fmt;

use chrono::{DateTime, Utc};

/// What the watcher last knew about a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceState {
    pub exists: bool,
    /// `None` when the resource is absent or its age is unknown.
    pub last_modified: Option<DateTime<Utc>>,
}

impl ResourceState {
    pub fn absent() -> Self {
        Self {
            exists: false,
            last_modified: None,
        }
    }

    pub fn present(last_modified: DateTime<Utc>) -> Self {
        Self {
            exists: true,
            last_modified: Some(last_modified),
        }
    }

    /// Present, but the modification time could not be read.
    pub fn present_unknown_age() -> Self {
        Self {
            exists: true,
            last_modified: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Absent on the previous observation, present now.
    Created,
    /// Present on both observations, with a strictly later modification time.
    Updated,
    /// Present on the previous observation, absent now.
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Notification delivered to change listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    pub location: String,
    pub kind: ChangeKind,
    /// The newly observed state, already recorded as last-known.
    pub state: ResourceState,
}

/// Outcome of comparing a fresh observation against the last-known state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    /// Record the observation without notifying: the previous state was a
    /// present resource of unknown age and we now have its timestamp.
    Baseline,
    Changed(ChangeKind),
}

pub fn detect_change(previous: &ResourceState, observed: &ResourceState) -> Transition {
    match (previous.exists, observed.exists) {
        (false, true) => Transition::Changed(ChangeKind::Created),
        (true, false) => Transition::Changed(ChangeKind::Deleted),
        (false, false) => Transition::Unchanged,
        (true, true) => match (previous.last_modified, observed.last_modified) {
            (Some(before), Some(now)) if now > before => Transition::Changed(ChangeKind::Updated),
            (None, Some(_)) => Transition::Baseline,
            _ => Transition::Unchanged,
        },
    }
}
