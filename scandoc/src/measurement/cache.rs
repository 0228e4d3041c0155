use std::path::{Path, PathBuf};

use tracing::debug;

use crate::measurement::source::{MeasurementRecord, MeasurementSource, SourceOpener};

/// State of the cache's single slot.
#[derive(Debug)]
struct Slot<S> {
    path: PathBuf,
    /// `None` marks a path that failed to open; it is remembered so a corrupt
    /// file is not re-probed for every scan that references it.
    source: Option<S>,
}

/// Single-slot cache over an opened measurement file.
///
/// Opening and indexing the legacy format is expensive, but consecutive scan
/// records in a registry usually point at the same data file, so one slot
/// captures the common case without a general LRU. The slot is replaced
/// wholesale whenever a lookup targets a different path.
#[derive(Debug)]
pub struct SourceCache<O: SourceOpener> {
    opener: O,
    slot: Option<Slot<O::Source>>,
}

impl<O: SourceOpener> SourceCache<O> {
    /// Creates an empty cache around an opener.
    pub fn new(opener: O) -> Self {
        Self { opener, slot: None }
    }

    /// Clears the slot, forcing the next lookup to re-open its file.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Looks up one scan's record in the measurement file at `path`.
    ///
    /// Returns `None` when the file does not exist, cannot be opened as a
    /// measurement file, or holds no record for the scan number. Open
    /// failures are cached and logged once at debug level; ingestion must
    /// continue over scans whose data file is unavailable or corrupt.
    pub fn record(&mut self, path: &Path, scan_number: &str) -> Option<&MeasurementRecord> {
        if !self.opener.exists(path) {
            return None;
        }

        let stale = match &self.slot {
            Some(slot) => slot.path != path,
            None => true,
        };
        if stale {
            let source = match self.opener.open(path) {
                Ok(source) => Some(source),
                Err(err) => {
                    debug!("not a readable measurement file `{}`: {}", path.display(), err);
                    None
                }
            };
            self.slot = Some(Slot {
                path: path.to_path_buf(),
                source,
            });
        }

        self.slot
            .as_ref()
            .and_then(|slot| slot.source.as_ref())
            .and_then(|source| source.record(scan_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::memory::{MemoryOpener, MemorySource};
    use crate::measurement::source::MeasurementRecord;
    use std::path::PathBuf;

    fn record(command: &str) -> MeasurementRecord {
        MeasurementRecord {
            command: command.to_owned(),
            ..MeasurementRecord::default()
        }
    }

    fn opener() -> MemoryOpener {
        let mut opener = MemoryOpener::new();
        opener.insert(
            MemorySource::new("/data/a.dat").with_record("1", record("ascan a 0 1 10 0.1")),
        );
        opener.insert(
            MemorySource::new("/data/b.dat").with_record("1", record("ascan b 0 1 10 0.1")),
        );
        opener
    }

    #[test]
    fn record_resolves_from_opened_file() {
        let mut cache = SourceCache::new(opener());

        let found = cache.record(Path::new("/data/a.dat"), "1").unwrap();
        assert_eq!(found.command, "ascan a 0 1 10 0.1");
    }

    #[test]
    fn record_missing_scan_number() {
        let mut cache = SourceCache::new(opener());
        assert!(cache.record(Path::new("/data/a.dat"), "99").is_none());
    }

    #[test]
    fn record_missing_file_short_circuits() {
        let mut cache = SourceCache::new(opener());

        assert!(cache.record(Path::new("/data/nope.dat"), "1").is_none());
        // The opener must not have been asked to open anything.
        assert_eq!(cache.opener.open_count(), 0);
    }

    #[test]
    fn record_reuses_slot_for_same_path() {
        let mut cache = SourceCache::new(opener());

        cache.record(Path::new("/data/a.dat"), "1").unwrap();
        cache.record(Path::new("/data/a.dat"), "1").unwrap();

        assert_eq!(cache.opener.open_count(), 1);
    }

    #[test]
    fn record_replaces_slot_on_path_change() {
        let mut cache = SourceCache::new(opener());

        assert!(cache.record(Path::new("/data/a.dat"), "1").is_some());
        assert!(cache.record(Path::new("/data/b.dat"), "1").is_some());
        assert!(cache.record(Path::new("/data/a.dat"), "1").is_some());

        assert_eq!(cache.opener.open_count(), 3);
    }

    #[test]
    fn record_caches_failed_open() {
        let mut opener = opener();
        opener.insert_unreadable("/data/corrupt.dat");
        let mut cache = SourceCache::new(opener);

        assert!(cache.record(Path::new("/data/corrupt.dat"), "1").is_none());
        assert!(cache.record(Path::new("/data/corrupt.dat"), "2").is_none());

        // The failed open is remembered; the file is probed once.
        assert_eq!(cache.opener.open_count(), 1);
    }

    #[test]
    fn invalidate_forces_reopen() {
        let mut cache = SourceCache::new(opener());

        cache.record(Path::new("/data/a.dat"), "1").unwrap();
        cache.invalidate();
        cache.record(Path::new("/data/a.dat"), "1").unwrap();

        assert_eq!(cache.opener.open_count(), 2);
    }

    #[test]
    fn exists_uses_opener_view_of_the_world() {
        let mut cache = SourceCache::new(opener());
        // No file at this path on disk, but the memory opener knows it.
        assert!(cache.record(&PathBuf::from("/data/b.dat"), "1").is_some());
    }
}
