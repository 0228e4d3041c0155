//! Typed documents emitted by the conversion.

mod document;

pub use document::{
    DataKey, DescriptorDocument, Document, DocumentKind, EventDocument, StartDocument,
    StopDocument,
};
