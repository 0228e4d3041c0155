//! Measurement-source access: record model, single-slot cache, provenance.
//!
//! The legacy columnar measurement format is an external collaborator; this
//! module defines the interface the conversion consumes ([`MeasurementSource`]
//! and [`SourceOpener`]), the per-scan record model, a single-slot cache that
//! avoids re-opening the same file for consecutive scans, and the resolver
//! that classifies a data column's semantic origin.

pub mod cache;
pub mod memory;
pub mod provenance;
mod source;

pub use cache::SourceCache;
pub use provenance::ProvenanceTag;
pub use source::{CountingBasis, MeasurementRecord, MeasurementSource, NamingTables, SourceOpener};
