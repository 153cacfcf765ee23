use std::sync::{Arc, Mutex};

use reswatch::watch::{ChangeKind, ChangeListener, ResourceChange};

/// A listener that remembers every change it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    changes: Arc<Mutex<Vec<ResourceChange>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<ResourceChange> {
        self.changes.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<ChangeKind> {
        self.changes.lock().unwrap().iter().map(|c| c.kind).collect()
    }

    pub fn count(&self) -> usize {
        self.changes.lock().unwrap().len()
    }
}

impl ChangeListener for RecordingListener {
    fn on_change(&self, change: &ResourceChange) -> anyhow::Result<()> {
        self.changes.lock().unwrap().push(change.clone());
        Ok(())
    }
}
