//! Dotted-path metadata flattening into nested document mappings.
//!
//! The document builder records scan-derived metadata in a sidecar keyed by
//! dotted paths such as `"start.SPEC.command"` or `"stop.num_events"`. This
//! module walks those paths into a target document's metadata tree, creating
//! nested mappings as needed. It is reused identically for `start` and
//! `stop` documents.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::DocumentKind;

/// Merges every sidecar entry for one document kind into a metadata tree.
///
/// Keys prefixed by `"<kind>."` have the prefix stripped and the remainder
/// split on `.`; intermediate segments walk or create nested mappings and the
/// final segment is assigned. A final-segment collision with an existing
/// value overwrites it (no merge of scalars); an intermediate collision with
/// a non-mapping value replaces that value with a fresh mapping.
pub fn merge_dotted(
    sidecar: &BTreeMap<String, Value>,
    kind: DocumentKind,
    target: &mut Map<String, Value>,
) {
    let prefix = format!("{kind}.");

    for (key, value) in sidecar {
        let Some(path) = key.strip_prefix(&prefix) else {
            continue;
        };

        let mut segments = path.split('.').collect::<Vec<_>>();
        let Some(last) = segments.pop() else {
            continue;
        };
        if last.is_empty() {
            continue;
        }

        let mut cursor = &mut *target;
        for segment in segments {
            let slot = cursor
                .entry(segment.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            cursor = slot
                .as_object_mut()
                .expect("slot was just ensured to be an object");
        }

        cursor.insert(last.to_owned(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sidecar(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn merge_dotted_creates_nested_mappings() {
        let sidecar = sidecar(&[(
            "start.metadata.DCM_energy.value",
            json!(11.871),
        )]);
        let mut target = Map::new();

        merge_dotted(&sidecar, DocumentKind::Start, &mut target);

        assert_eq!(
            Value::Object(target),
            json!({"metadata": {"DCM_energy": {"value": 11.871}}})
        );
    }

    #[test]
    fn merge_dotted_filters_by_kind_prefix() {
        let sidecar = sidecar(&[
            ("start.SPEC.command", json!("FlyScan ar 8.76 0 7.14")),
            ("stop.num_events", json!(11)),
        ]);

        let mut start = Map::new();
        merge_dotted(&sidecar, DocumentKind::Start, &mut start);
        assert!(start.contains_key("SPEC"));
        assert!(!start.contains_key("num_events"));

        let mut stop = Map::new();
        merge_dotted(&sidecar, DocumentKind::Stop, &mut stop);
        assert_eq!(stop.get("num_events"), Some(&json!(11)));
        assert!(!stop.contains_key("SPEC"));
    }

    #[test]
    fn merge_dotted_descends_into_existing_mapping() {
        // The builder seeds the SPEC block before flattening; sidecar paths
        // must merge into it rather than replace it.
        let sidecar = sidecar(&[("start.SPEC.command", json!("uascan"))]);
        let mut target = Map::new();
        target.insert("SPEC".to_owned(), json!({"filename": "/data/run.dat"}));

        merge_dotted(&sidecar, DocumentKind::Start, &mut target);

        assert_eq!(
            Value::Object(target),
            json!({"SPEC": {"filename": "/data/run.dat", "command": "uascan"}})
        );
    }

    #[test]
    fn merge_dotted_overwrites_scalar_on_last_segment() {
        let sidecar = sidecar(&[("stop.num_events", json!(11))]);
        let mut target = Map::new();
        target.insert("num_events".to_owned(), json!(0));

        merge_dotted(&sidecar, DocumentKind::Stop, &mut target);

        assert_eq!(target.get("num_events"), Some(&json!(11)));
    }

    #[test]
    fn merge_dotted_replaces_non_mapping_intermediate() {
        let sidecar = sidecar(&[("start.SPEC.command", json!("uascan"))]);
        let mut target = Map::new();
        target.insert("SPEC".to_owned(), json!("not a mapping"));

        merge_dotted(&sidecar, DocumentKind::Start, &mut target);

        assert_eq!(
            Value::Object(target),
            json!({"SPEC": {"command": "uascan"}})
        );
    }

    #[test]
    fn merge_dotted_deep_path() {
        let sidecar = sidecar(&[("start.a.b.c.d", json!(1))]);
        let mut target = Map::new();

        merge_dotted(&sidecar, DocumentKind::Start, &mut target);

        assert_eq!(
            Value::Object(target),
            json!({"a": {"b": {"c": {"d": 1}}}})
        );
    }

    #[test]
    fn merge_dotted_ignores_unrelated_prefixes() {
        let sidecar = sidecar(&[("event.something", json!(1)), ("startle.x", json!(2))]);
        let mut target = Map::new();

        merge_dotted(&sidecar, DocumentKind::Start, &mut target);

        assert!(target.is_empty());
    }
}
