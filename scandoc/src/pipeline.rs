//! Run orchestration: registry in, ordered document stream out.

use tracing::info;

use crate::builder::DocumentBuilder;
use crate::destination::Destination;
use crate::error::ScandocResult;
use crate::measurement::SourceOpener;
use crate::progress::ProgressReporter;
use crate::registry::ScanRegistry;

/// Counts reported at the end of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Number of scan records converted.
    pub scans: usize,
    /// Number of documents pushed to the destination.
    pub documents: usize,
}

/// Converts a loaded scan registry into a document stream.
///
/// The pipeline owns the registry, the document builder (and through it the
/// single-slot measurement cache), and the destination. Conversion is
/// single-threaded and synchronous: scans are processed in registry order
/// and each scan's documents are handed to the destination and dropped
/// before the next scan starts, bounding peak memory to one scan's worth of
/// documents.
#[derive(Debug)]
pub struct Pipeline<O: SourceOpener, D: Destination> {
    registry: ScanRegistry,
    builder: DocumentBuilder<O>,
    destination: D,
    progress: ProgressReporter,
}

impl<O: SourceOpener, D: Destination> Pipeline<O, D> {
    /// Creates a pipeline over a loaded registry.
    pub fn new(registry: ScanRegistry, opener: O, destination: D) -> Self {
        Self {
            registry,
            builder: DocumentBuilder::new(opener),
            destination,
            progress: ProgressReporter::default(),
        }
    }

    /// Replaces the default progress cadence.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the conversion to completion.
    ///
    /// Recoverable per-scan conditions (missing data file, missing data
    /// column) are handled inside the builder; any error that reaches this
    /// loop is fatal and aborts the run.
    pub fn run(mut self) -> ScandocResult<RunReport> {
        let total = self.registry.len();
        info!("converting {} scans to {} destination", total, D::name());

        let mut documents = 0usize;
        for record in self.registry.iter_mut() {
            let batch = self.builder.build(record)?;
            let batch_size = batch.len();
            documents += batch_size;

            self.destination.write_documents(batch)?;
            self.progress.scan_complete(batch_size, total);
        }

        self.destination.finish()?;

        let report = RunReport {
            scans: total,
            documents,
        };
        info!("{} scans", report.scans);
        info!("{} documents", report.documents);

        Ok(report)
    }
}
