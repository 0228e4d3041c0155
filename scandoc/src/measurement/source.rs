use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ScandocResult;

/// Counting basis of a scan: how long each observation point was acquired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountingBasis {
    /// Fixed counting time per point, in seconds.
    Time(f64),
    /// Fixed monitor counts per point.
    Monitor(f64),
}

/// Naming cross-reference tables carried by a measurement file.
///
/// The legacy format indexes motors and counters twice: by human-readable
/// name and by mnemonic. The provenance resolver consults these tables in
/// decreasing order of specificity.
#[derive(Debug, Clone, Default)]
pub struct NamingTables {
    /// Positioner (motor) names.
    pub positioner_names: Vec<String>,
    /// Positioner mnemonics.
    pub positioner_mnemonics: Vec<String>,
    /// Counter names.
    pub counter_names: Vec<String>,
    /// Counter mnemonics.
    pub counter_mnemonics: Vec<String>,
}

/// One scan's worth of columnar measurement data plus per-field metadata.
#[derive(Debug, Clone, Default)]
pub struct MeasurementRecord {
    /// The scan command line as recorded in the file.
    pub command: String,
    /// Base date-time string of the scan.
    pub date: String,
    /// Free-form comment lines attached to the scan.
    pub comments: Vec<String>,
    /// Declared column order; the first label names the column whose length
    /// defines the scan's observation count.
    pub labels: Vec<String>,
    /// Column data keyed by declared column name.
    pub data: BTreeMap<String, Vec<f64>>,
    /// Per-row elapsed seconds since the scan's base time, when recorded.
    pub elapsed: Option<Vec<f64>>,
    /// Positioner values snapshot at the start of the scan.
    pub positioners: BTreeMap<String, f64>,
    /// Free-form metadata key-value pairs.
    pub metadata: BTreeMap<String, String>,
    /// Counting basis, when the file records one.
    pub counting: Option<CountingBasis>,
    /// Naming cross-reference tables for provenance classification.
    pub naming: NamingTables,
}

/// Read-only view over one opened measurement file.
///
/// Implementations index the file once at open time; `record` lookups are
/// expected to be cheap afterwards.
pub trait MeasurementSource: std::fmt::Debug {
    /// Returns the path this source was opened from.
    fn path(&self) -> &Path;

    /// Returns the record for a scan number, if the file contains one.
    fn record(&self, scan_number: &str) -> Option<&MeasurementRecord>;
}

/// Opens measurement files on behalf of the [`super::SourceCache`].
///
/// The opener is the seam between the conversion and the legacy format's own
/// parser: production code wires a file-backed opener, tests wire
/// [`super::memory::MemoryOpener`].
pub trait SourceOpener {
    /// The source type produced by a successful open.
    type Source: MeasurementSource;

    /// Opens and indexes a measurement file.
    ///
    /// An error means the path does not hold a valid measurement file; the
    /// cache treats that as "no data available" rather than a failure.
    fn open(&self, path: &Path) -> ScandocResult<Self::Source>;

    /// Returns whether a measurement file exists at the path.
    ///
    /// The default checks the filesystem; in-memory openers override this.
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
