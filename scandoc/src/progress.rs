//! Best-effort progress notifications for long-running conversions.

use std::time::{Duration, Instant};

use tracing::info;

/// Emits throttled progress lines while the pipeline converts scans.
///
/// A line is emitted when either threshold is hit: the configured time
/// interval has elapsed since the last line, or the configured number of
/// scans has completed since the last line. Reporting is a side channel and
/// never gates correctness.
#[derive(Debug)]
pub struct ProgressReporter {
    interval: Duration,
    every_scans: usize,
    last_report: Instant,
    scans_since_report: usize,
    scans: usize,
    documents: usize,
}

impl ProgressReporter {
    /// Default reporting interval.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    /// Default scan-count reporting threshold.
    pub const DEFAULT_EVERY_SCANS: usize = 250;

    /// Creates a reporter with explicit thresholds.
    pub fn new(interval: Duration, every_scans: usize) -> Self {
        Self {
            interval,
            every_scans: every_scans.max(1),
            last_report: Instant::now(),
            scans_since_report: 0,
            scans: 0,
            documents: 0,
        }
    }

    /// Records one converted scan and emits a progress line when due.
    ///
    /// Returns whether a line was emitted, which keeps the throttling
    /// observable in tests.
    pub fn scan_complete(&mut self, documents: usize, total_scans: usize) -> bool {
        self.scans += 1;
        self.documents += documents;
        self.scans_since_report += 1;

        let due = self.scans_since_report >= self.every_scans
            || self.last_report.elapsed() >= self.interval;
        if due {
            info!(
                "converted {}/{} scans, {} documents so far",
                self.scans, total_scans, self.documents
            );
            self.last_report = Instant::now();
            self.scans_since_report = 0;
        }

        due
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_EVERY_SCANS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_n_scans() {
        let mut progress = ProgressReporter::new(Duration::from_secs(3600), 3);

        assert!(!progress.scan_complete(1, 10));
        assert!(!progress.scan_complete(1, 10));
        assert!(progress.scan_complete(1, 10));
        // The counter resets after a report.
        assert!(!progress.scan_complete(1, 10));
    }

    #[test]
    fn reports_after_interval() {
        let mut progress = ProgressReporter::new(Duration::ZERO, usize::MAX);
        assert!(progress.scan_complete(1, 10));
    }

    #[test]
    fn zero_scan_threshold_behaves_as_one() {
        let mut progress = ProgressReporter::new(Duration::from_secs(3600), 0);
        assert!(progress.scan_complete(1, 10));
    }
}
