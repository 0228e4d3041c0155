//! In-memory measurement source for testing and development purposes.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, ScandocResult};
use crate::measurement::source::{MeasurementRecord, MeasurementSource, SourceOpener};
use crate::scandoc_error;

/// A measurement file held entirely in memory.
///
/// Useful for exercising the cache, builder, and pipeline without fixture
/// files on disk.
#[derive(Debug, Clone)]
pub struct MemorySource {
    path: PathBuf,
    records: HashMap<String, MeasurementRecord>,
}

impl MemorySource {
    /// Creates an empty source that pretends to live at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: HashMap::new(),
        }
    }

    /// Adds a scan record under a scan number.
    pub fn with_record(mut self, scan_number: impl Into<String>, record: MeasurementRecord) -> Self {
        self.records.insert(scan_number.into(), record);
        self
    }
}

impl MeasurementSource for MemorySource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, scan_number: &str) -> Option<&MeasurementRecord> {
        self.records.get(scan_number)
    }
}

/// Opener over a fixed set of in-memory sources.
///
/// Paths registered with [`MemoryOpener::insert_unreadable`] exist but fail
/// to open, which simulates a file that is not a valid measurement file.
/// Every open attempt is counted so tests can assert the cache's single-slot
/// behavior.
#[derive(Debug, Default)]
pub struct MemoryOpener {
    sources: HashMap<PathBuf, MemorySource>,
    unreadable: HashSet<PathBuf>,
    opens: Cell<usize>,
}

impl MemoryOpener {
    /// Creates an opener with no known paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source under its own path.
    pub fn insert(&mut self, source: MemorySource) {
        self.sources.insert(source.path.clone(), source);
    }

    /// Registers a path that exists but cannot be opened.
    pub fn insert_unreadable(&mut self, path: impl Into<PathBuf>) {
        self.unreadable.insert(path.into());
    }

    /// Returns how many opens have been attempted.
    pub fn open_count(&self) -> usize {
        self.opens.get()
    }
}

impl SourceOpener for MemoryOpener {
    type Source = MemorySource;

    fn open(&self, path: &Path) -> ScandocResult<MemorySource> {
        self.opens.set(self.opens.get() + 1);

        if let Some(source) = self.sources.get(path) {
            return Ok(source.clone());
        }

        Err(scandoc_error!(
            ErrorKind::SourceOpenFailed,
            "Not a valid measurement file",
            format!("path `{}`", path.display())
        ))
    }

    fn exists(&self, path: &Path) -> bool {
        self.sources.contains_key(path) || self.unreadable.contains(path)
    }
}
