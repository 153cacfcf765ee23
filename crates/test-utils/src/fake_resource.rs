use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use reswatch::errors::{ReswatchError, Result};
use reswatch::resource::{ByteStream, Resource};

/// What a scripted existence check does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Present,
    Absent,
    /// Fail with a `ResourceAccess` error.
    Failing,
}

#[derive(Debug)]
struct Script {
    queued: VecDeque<Existence>,
    steady: Existence,
    last_modified: DateTime<Utc>,
    last_modified_fails: bool,
    content: Vec<u8>,
    exists_calls: usize,
    last_modified_calls: usize,
}

/// A resource whose behaviour is fully controlled by the test.
///
/// Existence checks first consume any queued outcomes, then repeat the
/// steady outcome. Wrap it in an `Arc` and keep a clone to change the
/// script while a watcher polls it.
#[derive(Debug)]
pub struct ScriptedResource {
    location: String,
    script: Mutex<Script>,
}

impl ScriptedResource {
    pub fn new(location: &str, steady: Existence, last_modified: DateTime<Utc>) -> Self {
        Self {
            location: location.to_string(),
            script: Mutex::new(Script {
                queued: VecDeque::new(),
                steady,
                last_modified,
                last_modified_fails: false,
                content: Vec::new(),
                exists_calls: 0,
                last_modified_calls: 0,
            }),
        }
    }

    pub fn present(location: &str, last_modified: DateTime<Utc>) -> Self {
        Self::new(location, Existence::Present, last_modified)
    }

    pub fn absent(location: &str) -> Self {
        Self::new(location, Existence::Absent, Utc::now())
    }

    pub fn failing(location: &str) -> Self {
        Self::new(location, Existence::Failing, Utc::now())
    }

    /// Fail the first `failures` existence checks, then behave as `then`.
    pub fn failing_first(location: &str, failures: usize, then: Existence) -> Self {
        let resource = Self::new(location, then, Utc::now());
        resource.queue(std::iter::repeat_n(Existence::Failing, failures));
        resource
    }

    pub fn with_content(self, content: impl Into<Vec<u8>>) -> Self {
        self.script.lock().unwrap().content = content.into();
        self
    }

    pub fn queue(&self, outcomes: impl IntoIterator<Item = Existence>) {
        self.script.lock().unwrap().queued.extend(outcomes);
    }

    pub fn set_existence(&self, steady: Existence) {
        let mut script = self.script.lock().unwrap();
        script.queued.clear();
        script.steady = steady;
    }

    pub fn set_last_modified(&self, last_modified: DateTime<Utc>) {
        self.script.lock().unwrap().last_modified = last_modified;
    }

    pub fn set_last_modified_fails(&self, fails: bool) {
        self.script.lock().unwrap().last_modified_fails = fails;
    }

    pub fn exists_calls(&self) -> usize {
        self.script.lock().unwrap().exists_calls
    }

    pub fn last_modified_calls(&self) -> usize {
        self.script.lock().unwrap().last_modified_calls
    }
}

impl Resource for ScriptedResource {
    fn location(&self) -> &str {
        &self.location
    }

    fn exists(&self) -> Result<bool> {
        let mut script = self.script.lock().unwrap();
        script.exists_calls += 1;
        let outcome = script.queued.pop_front().unwrap_or(script.steady);
        match outcome {
            Existence::Present => Ok(true),
            Existence::Absent => Ok(false),
            Existence::Failing => Err(ReswatchError::access(
                &self.location,
                "scripted existence failure",
            )),
        }
    }

    fn last_modified(&self) -> Result<DateTime<Utc>> {
        let mut script = self.script.lock().unwrap();
        script.last_modified_calls += 1;
        if script.last_modified_fails {
            return Err(ReswatchError::access(
                &self.location,
                "scripted last-modified failure",
            ));
        }
        Ok(script.last_modified)
    }

    fn read(&self) -> Result<ByteStream> {
        let content = self.script.lock().unwrap().content.clone();
        Ok(Box::new(Cursor::new(content)))
    }
}
