use std::sync::{Arc, Mutex};

use crate::destination::base::Destination;
use crate::error::ScandocResult;
use crate::types::Document;

#[derive(Debug, Default)]
struct Inner {
    batches: Vec<Vec<Document>>,
}

/// In-memory destination for testing and development purposes.
///
/// [`MemoryDestination`] captures every batch it receives, preserving the
/// per-scan batch boundaries the pipeline produced. Clones share storage, so
/// tests can keep a handle, hand a clone to the pipeline, and inspect the
/// captured stream afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    /// Creates a new empty memory destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all captured documents in arrival order.
    pub fn documents(&self) -> Vec<Document> {
        let inner = self.lock();
        inner.batches.iter().flatten().cloned().collect()
    }

    /// Returns a copy of the captured batches with their boundaries intact.
    pub fn batches(&self) -> Vec<Vec<Document>> {
        self.lock().batches.clone()
    }

    /// Clears all captured documents.
    pub fn clear(&self) {
        self.lock().batches.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Destination for MemoryDestination {
    fn name() -> &'static str {
        "memory"
    }

    fn write_documents(&mut self, documents: Vec<Document>) -> ScandocResult<()> {
        self.lock().batches.push(documents);
        Ok(())
    }
}
