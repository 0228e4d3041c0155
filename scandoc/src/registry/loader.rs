use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::bail;
use crate::error::{ErrorKind, ScandocResult};
use crate::registry::{ScanId, ScanRecord, ScanRegistry, ScanState};

/// Loads one scan-log XML file into the registry.
///
/// Every `scan` element becomes a [`ScanRecord`] keyed by its mandatory `id`
/// attribute; an entry without an id fails the whole file's load before any
/// record is upserted, so a partially-ingested file can never leave the
/// registry with unidentifiable entries. Keys already present are replaced
/// wholesale (last-write-wins).
///
/// Returns the number of entries loaded from the file.
pub fn load_scan_log(registry: &mut ScanRegistry, path: &Path) -> ScandocResult<usize> {
    let text = fs::read_to_string(path).map_err(|err| {
        crate::scandoc_error!(
            ErrorKind::IoError,
            "Failed to read scan log",
            detail = format!("file `{}`", path.display()),
            source: err
        )
    })?;

    let document = roxmltree::Document::parse(&text)?;

    // Stage every record before touching the registry so a malformed entry
    // aborts the file atomically.
    let mut staged = Vec::new();
    for (index, node) in document
        .root_element()
        .children()
        .filter(|node| node.is_element() && node.has_tag_name("scan"))
        .enumerate()
    {
        let Some(id) = node.attribute("id") else {
            bail!(
                ErrorKind::MalformedLogEntry,
                "Scan entry is missing its id attribute",
                format!("file `{}`, entry {index}", path.display())
            );
        };

        staged.push(parse_scan_entry(id, &node, path));
    }

    let loaded = staged.len();
    for record in staged {
        registry.upsert(record);
    }

    info!("loaded {} scans from `{}`", loaded, path.display());

    Ok(loaded)
}

/// Builds one [`ScanRecord`] from a `scan` element.
fn parse_scan_entry(id: &str, node: &roxmltree::Node<'_, '_>, source_log: &Path) -> ScanRecord {
    let mut record = ScanRecord {
        id: ScanId::new(id),
        run_uid: Uuid::new_v4().simple().to_string(),
        number: node.attribute("number").unwrap_or_default().to_owned(),
        state: ScanState::parse(node.attribute("state")),
        scan_type: node.attribute("type").unwrap_or_default().to_owned(),
        title: String::new(),
        data_file: None,
        started: None,
        ended: None,
        source_log: source_log.to_path_buf(),
        extra: BTreeMap::new(),
        stream_meta: BTreeMap::new(),
    };

    for child in node.children().filter(|child| child.is_element()) {
        match child.tag_name().name() {
            "started" => record.started = combined_timestamp(&child),
            "ended" => record.ended = combined_timestamp(&child),
            "title" => record.title = child.text().unwrap_or_default().to_owned(),
            "file" => {
                let file = child.text().unwrap_or_default();
                if !file.is_empty() {
                    record.data_file = Some(PathBuf::from(file));
                }
            }
            other => {
                record
                    .extra
                    .insert(other.to_owned(), child.text().unwrap_or_default().to_owned());
            }
        }
    }

    record
}

/// Combines the `date` and `time` attributes of a `started`/`ended` element.
fn combined_timestamp(node: &roxmltree::Node<'_, '_>) -> Option<String> {
    match (node.attribute("date"), node.attribute("time")) {
        (Some(date), Some(time)) => Some(format!("{date} {time}")),
        _ => None,
    }
}
