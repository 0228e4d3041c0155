use crate::error::ScandocResult;
use crate::types::Document;

/// Trait for sinks that can receive the converted document stream.
///
/// [`Destination`] implementations define where the ordered stream of typed
/// documents goes. The pipeline hands over one scan's documents at a time and
/// drops them afterwards, so a destination that writes incrementally bounds
/// peak memory to a single scan's documents.
///
/// The trait also provides an optional [`Destination::finish`] method with a
/// default no-op implementation. Override it if the destination needs to
/// finalize its output when the run completes.
pub trait Destination {
    /// Returns the name of the destination.
    fn name() -> &'static str;

    /// Writes one scan's ordered batch of documents.
    ///
    /// Batches arrive in registry order and documents within a batch are
    /// already ordered (`start`, data documents, `stop`); destinations must
    /// preserve both orderings.
    fn write_documents(&mut self, documents: Vec<Document>) -> ScandocResult<()>;

    /// Finalizes the destination's output at the end of a run.
    ///
    /// The default implementation is a no-op.
    fn finish(&mut self) -> ScandocResult<()> {
        Ok(())
    }
}
