use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::measurement::ProvenanceTag;

/// Opens one scan's lifecycle in the document stream.
///
/// Required fields are typed; everything injected from the stream-metadata
/// sidecar (the `SPEC` block, positioner snapshots, free-form metadata)
/// lives in [`StartDocument::metadata`] and serializes inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartDocument {
    /// Scan start, float seconds since the UNIX epoch.
    pub time: f64,
    /// Macro/plan name that produced the scan.
    pub plan_name: String,
    /// The scan's stable run identifier.
    pub uid: String,
    /// Log-relative scan number.
    pub scan_id: String,
    /// Human-readable companion of `time`.
    pub time_text: String,
    /// Identity of the originating scan-log entry.
    pub scanlog_id: String,
    /// Flattened sidecar content, serialized inline.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Declares the shape and provenance of one data column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataKey {
    /// Value type of the column; always `"number"` for columnar data.
    pub dtype: &'static str,
    /// Semantic origin of the column.
    pub source: ProvenanceTag,
    /// Per-observation shape; scalar columns have an empty shape.
    pub shape: Vec<u64>,
    /// The raw column name before sanitization.
    #[serde(rename = "originalName")]
    pub original_name: String,
}

impl DataKey {
    /// Creates the entry for a scalar numeric column.
    pub fn number(source: ProvenanceTag, original_name: impl Into<String>) -> Self {
        Self {
            dtype: "number",
            source,
            shape: Vec::new(),
            original_name: original_name.into(),
        }
    }
}

/// Declares the columns of a scan's observation stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptorDocument {
    /// Base time of the scan's data, float seconds since the UNIX epoch.
    pub time: f64,
    /// Identifier of this descriptor, referenced by event documents.
    pub uid: String,
    /// Back-reference to the originating start document's uid.
    pub run_start: String,
    /// Column declarations keyed by sanitized column name; omitted when the
    /// scan declared no columns.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data_keys: BTreeMap<String, DataKey>,
    /// Human-readable companion of `time`.
    pub time_text: String,
}

/// One observation row's timestamped data values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDocument {
    /// Observation time: the scan's base time plus the row's elapsed seconds.
    pub time: f64,
    /// Identifier of this event.
    pub uid: String,
    /// Position in the observation stream, starting at 1.
    pub seq_num: u64,
    /// Back-reference to the descriptor declaring this event's columns.
    pub descriptor: String,
    /// Column values keyed by sanitized column name.
    pub data: BTreeMap<String, f64>,
    /// Per-column observation timestamps; the columnar source records one
    /// time per row, so every column carries the row time.
    pub timestamps: BTreeMap<String, f64>,
    /// Human-readable companion of `time`.
    pub time_text: String,
}

/// Closes one scan's lifecycle in the document stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopDocument {
    /// Scan end, float seconds since the UNIX epoch.
    pub time: f64,
    /// Identifier of this stop document.
    pub uid: String,
    /// Back-reference to the originating start document's uid.
    pub run_start: String,
    /// Archive exit status mapped from the log state.
    pub exit_status: String,
    /// Human-readable companion of `time`.
    pub time_text: String,
    /// The log state verbatim.
    pub scanlog_state: String,
    /// Flattened sidecar content (`num_events`, ...), serialized inline.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// One document in the ordered stream.
///
/// Serializes as the `[kind, body]` pair the archive consumer expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Opens a scan's lifecycle.
    Start(StartDocument),
    /// Declares observation columns.
    Descriptor(DescriptorDocument),
    /// One observation row.
    Event(EventDocument),
    /// Closes a scan's lifecycle.
    Stop(StopDocument),
}

impl Document {
    /// Returns the [`DocumentKind`] that corresponds to this document.
    pub fn kind(&self) -> DocumentKind {
        self.into()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(self.kind().as_str())?;
        match self {
            Document::Start(doc) => pair.serialize_element(doc)?,
            Document::Descriptor(doc) => pair.serialize_element(doc)?,
            Document::Event(doc) => pair.serialize_element(doc)?,
            Document::Stop(doc) => pair.serialize_element(doc)?,
        }
        pair.end()
    }
}

/// Classification of document kinds without the associated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Lifecycle opener.
    Start,
    /// Column declaration.
    Descriptor,
    /// Observation row.
    Event,
    /// Lifecycle closer.
    Stop,
}

impl DocumentKind {
    /// Returns the wire form of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Start => "start",
            DocumentKind::Descriptor => "descriptor",
            DocumentKind::Event => "event",
            DocumentKind::Stop => "stop",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Document> for DocumentKind {
    fn from(document: &Document) -> Self {
        match document {
            Document::Start(_) => DocumentKind::Start,
            Document::Descriptor(_) => DocumentKind::Descriptor,
            Document::Event(_) => DocumentKind::Event,
            Document::Stop(_) => DocumentKind::Stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_document_flattens_metadata_inline() {
        let mut metadata = Map::new();
        metadata.insert(
            "SPEC".to_owned(),
            json!({"filename": "/data/run.dat", "title": "sample"}),
        );

        let document = Document::Start(StartDocument {
            time: 1413238088.0,
            plan_name: "FlyScan".to_owned(),
            uid: "abc".to_owned(),
            scan_id: "125".to_owned(),
            time_text: "2014-10-13 22:08:08".to_owned(),
            scanlog_id: "125:/data/run.dat".to_owned(),
            metadata,
        });

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value[0], json!("start"));
        assert_eq!(value[1]["plan_name"], json!("FlyScan"));
        assert_eq!(value[1]["SPEC"]["filename"], json!("/data/run.dat"));
        // Flattened content sits inline, not under a wrapper key.
        assert!(value[1].get("metadata").is_none());
    }

    #[test]
    fn descriptor_omits_empty_data_keys() {
        let document = DescriptorDocument {
            time: 0.0,
            uid: "d".to_owned(),
            run_start: "r".to_owned(),
            data_keys: BTreeMap::new(),
            time_text: "1970-01-01 00:00:00".to_owned(),
        };

        let value = serde_json::to_value(&document).unwrap();
        assert!(value.get("data_keys").is_none());
    }

    #[test]
    fn data_key_wire_shape() {
        let key = DataKey::number(ProvenanceTag::RawValue, "H K L");
        let value = serde_json::to_value(&key).unwrap();
        assert_eq!(
            value,
            json!({
                "dtype": "number",
                "source": "raw-value",
                "shape": [],
                "originalName": "H K L",
            })
        );
    }

    #[test]
    fn document_kind_round_trip() {
        let document = Document::Stop(StopDocument {
            time: 0.0,
            uid: "u".to_owned(),
            run_start: "r".to_owned(),
            exit_status: "success".to_owned(),
            time_text: "1970-01-01 00:00:00".to_owned(),
            scanlog_state: "complete".to_owned(),
            metadata: Map::new(),
        });

        assert_eq!(document.kind(), DocumentKind::Stop);
        assert_eq!(document.kind().to_string(), "stop");
    }
}
