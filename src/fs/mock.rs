// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct MockFile {
    pub content: Vec<u8>,
    pub modified: SystemTime,
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, MockFile>,
    // When set, every call fails as if the backing device were unreachable.
    unavailable: bool,
}

/// In-memory filesystem with controllable modification times.
///
/// Clones share the same state, so a test can keep one handle and mutate
/// files while a watcher polls through another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file_at(path, content, SystemTime::now());
    }

    pub fn add_file_at(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        let mut state = self.state.lock().unwrap();
        state.files.insert(
            path.as_ref().to_path_buf(),
            MockFile {
                content: content.into(),
                modified,
            },
        );
    }

    /// Set the modification time of an existing file.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut state = self.state.lock().unwrap();
        if let Some(file) = state.files.get_mut(path.as_ref()) {
            file.modified = modified;
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.files.remove(path.as_ref());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> Result<bool> {
        let state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(anyhow!("Filesystem unavailable: {:?}", path));
        }
        Ok(state.files.contains_key(path))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(anyhow!("Filesystem unavailable: {:?}", path));
        }
        match state.files.get(path) {
            Some(file) => Ok(file.modified),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(anyhow!("Filesystem unavailable: {:?}", path));
        }
        match state.files.get(path) {
            Some(file) => Ok(Box::new(Cursor::new(file.content.clone()))),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}
