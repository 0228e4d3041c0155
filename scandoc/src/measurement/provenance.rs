use std::fmt;

use serde::{Serialize, Serializer};

use crate::measurement::source::MeasurementRecord;

/// Semantic origin of a measurement data column.
///
/// Purely descriptive metadata attached to a column's descriptor entry; it
/// never affects the data values themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvenanceTag {
    /// The column name appears directly in the scan's positioner snapshot.
    Positioner,
    /// The column name matches a positioner name table entry.
    PositionerByName,
    /// The column name matches a positioner mnemonic table entry.
    PositionerByMnemonic,
    /// The column name matches a counter name table entry.
    CounterByName,
    /// The column name matches a counter mnemonic table entry.
    CounterByMnemonic,
    /// No cross-reference matched; the column is a raw value.
    RawValue,
}

impl ProvenanceTag {
    /// Classifies a column name against a record's naming tables.
    ///
    /// Resolution order reflects the decreasing specificity of the source's
    /// own indexing tables; the first match wins.
    pub fn classify(field: &str, record: &MeasurementRecord) -> ProvenanceTag {
        let naming = &record.naming;

        if record.positioners.contains_key(field) {
            ProvenanceTag::Positioner
        } else if naming.positioner_names.iter().any(|name| name == field) {
            ProvenanceTag::PositionerByName
        } else if naming.positioner_mnemonics.iter().any(|name| name == field) {
            ProvenanceTag::PositionerByMnemonic
        } else if naming.counter_names.iter().any(|name| name == field) {
            ProvenanceTag::CounterByName
        } else if naming.counter_mnemonics.iter().any(|name| name == field) {
            ProvenanceTag::CounterByMnemonic
        } else {
            ProvenanceTag::RawValue
        }
    }

    /// Returns the wire form used in descriptor documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceTag::Positioner => "positioner",
            ProvenanceTag::PositionerByName => "positioner-by-name",
            ProvenanceTag::PositionerByMnemonic => "positioner-by-mnemonic",
            ProvenanceTag::CounterByName => "counter-by-name",
            ProvenanceTag::CounterByMnemonic => "counter-by-mnemonic",
            ProvenanceTag::RawValue => "raw-value",
        }
    }
}

impl fmt::Display for ProvenanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProvenanceTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::source::NamingTables;

    fn record() -> MeasurementRecord {
        let mut record = MeasurementRecord::default();
        record.positioners.insert("ar".to_owned(), 8.76);
        record.naming = NamingTables {
            positioner_names: vec!["SampleY".to_owned(), "ar".to_owned()],
            positioner_mnemonics: vec!["sy".to_owned()],
            counter_names: vec!["I0".to_owned()],
            counter_mnemonics: vec!["seconds".to_owned(), "I0".to_owned()],
        };
        record
    }

    #[test]
    fn classify_direct_positioner_wins() {
        // `ar` is also in the positioner name table; the direct snapshot
        // entry is more specific and must win.
        assert_eq!(
            ProvenanceTag::classify("ar", &record()),
            ProvenanceTag::Positioner
        );
    }

    #[test]
    fn classify_positioner_by_name() {
        assert_eq!(
            ProvenanceTag::classify("SampleY", &record()),
            ProvenanceTag::PositionerByName
        );
    }

    #[test]
    fn classify_positioner_by_mnemonic() {
        assert_eq!(
            ProvenanceTag::classify("sy", &record()),
            ProvenanceTag::PositionerByMnemonic
        );
    }

    #[test]
    fn classify_counter_by_name_beats_mnemonic() {
        assert_eq!(
            ProvenanceTag::classify("I0", &record()),
            ProvenanceTag::CounterByName
        );
    }

    #[test]
    fn classify_counter_by_mnemonic() {
        assert_eq!(
            ProvenanceTag::classify("seconds", &record()),
            ProvenanceTag::CounterByMnemonic
        );
    }

    #[test]
    fn classify_fallback_raw_value() {
        assert_eq!(
            ProvenanceTag::classify("Epoch", &record()),
            ProvenanceTag::RawValue
        );
    }

    #[test]
    fn wire_strings() {
        assert_eq!(ProvenanceTag::Positioner.to_string(), "positioner");
        assert_eq!(
            serde_json::to_value(ProvenanceTag::CounterByMnemonic).unwrap(),
            serde_json::json!("counter-by-mnemonic")
        );
    }
}
