use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

/// Identity of one scan-log entry.
///
/// The log's `id` attribute is a composite of the log-relative scan number
/// and the source data file path (for example `125:/share1/data/run.dat`),
/// which makes it unique across sessions that reuse scan numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanId(String);

impl ScanId {
    /// Wraps a raw `id` attribute value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal state of a scan as recorded by the scan log.
///
/// The log writes free-form state strings; the two understood terminal states
/// map to archive exit statuses, `unknown` suppresses the stop document, and
/// anything else is preserved verbatim so the builder can refuse to guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// The scan ran to completion.
    Complete,
    /// The log still marks the scan as in progress; it was aborted mid-run.
    Scanning,
    /// The log does not know how the scan ended.
    Unknown,
    /// A state string this converter does not understand.
    Other(String),
}

impl ScanState {
    /// Parses a `state` attribute value; a missing attribute maps to [`ScanState::Unknown`].
    pub fn parse(state: Option<&str>) -> Self {
        match state {
            Some("complete") => ScanState::Complete,
            Some("scanning") => ScanState::Scanning,
            Some("unknown") | None => ScanState::Unknown,
            Some(other) => ScanState::Other(other.to_owned()),
        }
    }

    /// Returns the state string as the log recorded it.
    pub fn as_str(&self) -> &str {
        match self {
            ScanState::Complete => "complete",
            ScanState::Scanning => "scanning",
            ScanState::Unknown => "unknown",
            ScanState::Other(other) => other,
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One XML-derived scan entry.
///
/// Created by the registry loader; the document builder later populates
/// [`ScanRecord::stream_meta`] while constructing the scan's documents.
/// Records live for the whole run and are never deleted.
#[derive(Debug, Clone)]
pub struct ScanRecord {
    /// Identity of the entry within the registry.
    pub id: ScanId,
    /// Run identifier generated once at load time, stable for the record's
    /// lifetime; becomes the `uid` of the start document.
    pub run_uid: String,
    /// Log-relative scan number in string form.
    pub number: String,
    /// Terminal state recorded by the log.
    pub state: ScanState,
    /// Macro/plan name that produced the scan.
    pub scan_type: String,
    /// Operator-supplied scan title.
    pub title: String,
    /// Path of the measurement data file, when the log names one.
    pub data_file: Option<PathBuf>,
    /// Combined `"<date> <time>"` start timestamp.
    pub started: Option<String>,
    /// Combined `"<date> <time>"` end timestamp.
    pub ended: Option<String>,
    /// Path of the scan-log file this entry came from.
    pub source_log: PathBuf,
    /// Unrecognized child elements captured verbatim by tag name.
    pub extra: BTreeMap<String, String>,
    /// Stream-metadata sidecar: dotted document paths
    /// (`"start.SPEC.command"`, `"stop.num_events"`, ...) to values,
    /// populated during document construction and consumed by the
    /// metadata flattener. Sorted iteration keeps document output
    /// deterministic.
    pub stream_meta: BTreeMap<String, Value>,
}

impl ScanRecord {
    /// Records a sidecar value under a dotted document path.
    pub fn record_stream_meta(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.stream_meta.insert(path.into(), value.into());
    }
}
