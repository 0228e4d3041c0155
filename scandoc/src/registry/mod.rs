//! Scan registry: keyed collection of scan-log entries.
//!
//! One or more scan-log XML files load into a single [`ScanRegistry`]. Entries
//! are keyed by the log's mandatory `id` attribute; loading a key that is
//! already present replaces the record wholesale (no field-level merge), so
//! operators can re-run ingestion after correcting a log file. Iteration
//! preserves first-insertion order, which fixes the document stream's scan
//! ordering across reloads.

mod loader;
mod record;

pub use loader::load_scan_log;
pub use record::{ScanId, ScanRecord, ScanState};

use indexmap::IndexMap;

/// Insertion-ordered collection of scan records keyed by scan id.
#[derive(Debug, Default)]
pub struct ScanRegistry {
    scans: IndexMap<ScanId, ScanRecord>,
}

impl ScanRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            scans: IndexMap::new(),
        }
    }

    /// Returns the number of distinct scan ids in the registry.
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Returns true if the registry holds no scans.
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Inserts a record, replacing any record already stored under its id.
    ///
    /// A replaced key keeps its original position, so reloading a corrected
    /// log file does not reorder the document stream.
    pub fn upsert(&mut self, record: ScanRecord) {
        self.scans.insert(record.id.clone(), record);
    }

    /// Returns the record stored under the given id, if any.
    pub fn get(&self, id: &ScanId) -> Option<&ScanRecord> {
        self.scans.get(id)
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ScanRecord> {
        self.scans.values()
    }

    /// Iterates records mutably in insertion order.
    ///
    /// The document builder uses this to populate each record's
    /// stream-metadata sidecar while constructing documents.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ScanRecord> {
        self.scans.values_mut()
    }
}
