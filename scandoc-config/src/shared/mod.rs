//! Shared configuration structures.

mod converter;

pub use converter::{ConverterConfig, OutputConfig, ProgressConfig};

use thiserror::Error;

/// Errors produced by configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field holds a value outside its allowed range.
    #[error("invalid value for `{field}`: {constraint}")]
    InvalidFieldValue {
        /// Dotted path of the offending field.
        field: String,
        /// Human-readable constraint description.
        constraint: String,
    },
}
