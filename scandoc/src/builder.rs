//! Per-scan document construction.
//!
//! The builder produces the full ordered document list for one scan record:
//! it attempts measurement extraction through the single-slot source cache,
//! dispatches on the acquisition macro, constructs the `start`, zero-or-more
//! `descriptor`/`event`, and `stop` documents, and stitches stream-level
//! metadata (event counts, image-file paths) back through the scan's
//! stream-metadata sidecar.

use std::collections::BTreeMap;

use serde_json::{Map, json};
use tracing::warn;
use uuid::Uuid;

use crate::conversions::name::sanitize_name;
use crate::conversions::time::{parse_timestamp, time_text};
use crate::error::{ErrorKind, ScandocResult};
use crate::flatten::merge_dotted;
use crate::measurement::{
    CountingBasis, MeasurementRecord, ProvenanceTag, SourceCache, SourceOpener,
};
use crate::registry::{ScanRecord, ScanState};
use crate::types::{
    DataKey, DescriptorDocument, Document, DocumentKind, EventDocument, StartDocument,
    StopDocument,
};
use crate::{bail, scandoc_error};

/// Comment marker ahead of a fly scan's external data file path.
const FLY_FILE_MARKER: &str = "FlyScan file name = ";

/// Known acquisition macro kinds, dispatched from a command's first token.
///
/// Image-frame and fly macros store their bulk data outside the columnar
/// record, so they yield no per-point documents; everything else is treated
/// as a standard step scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    /// Image-only acquisition; the command names an external image file.
    ImageFrame,
    /// Fly scan; a comment line names the external data file.
    Fly,
    /// Standard step/point scan with columnar observations.
    Step,
}

impl MacroKind {
    /// Classifies a measurement command by its first token.
    pub fn from_command(command: &str) -> MacroKind {
        match command.split_whitespace().next() {
            Some("SAXS") | Some("WAXS") => MacroKind::ImageFrame,
            Some("FlyScan") => MacroKind::Fly,
            _ => MacroKind::Step,
        }
    }
}

/// Builds the ordered document list for each scan record.
///
/// Owns the measurement-source cache; the cache's single slot is safe
/// because document construction is strictly sequential.
#[derive(Debug)]
pub struct DocumentBuilder<O: SourceOpener> {
    cache: SourceCache<O>,
}

impl<O: SourceOpener> DocumentBuilder<O> {
    /// Creates a builder that opens measurement files through `opener`.
    pub fn new(opener: O) -> Self {
        Self {
            cache: SourceCache::new(opener),
        }
    }

    /// Produces the full ordered document list for one scan record.
    ///
    /// Emit order is `start`, then any `descriptor`/`event` documents in
    /// extraction order, then `stop` (suppressed for an unknown state).
    /// Measurement extraction runs first so the sidecar is populated before
    /// the `start` and `stop` documents are flattened.
    pub fn build(&mut self, record: &mut ScanRecord) -> ScandocResult<Vec<Document>> {
        let data_documents = self.extract_measurement(record)?;

        let mut documents = Vec::with_capacity(data_documents.len() + 2);
        documents.push(build_start(record)?);
        documents.extend(data_documents);
        if let Some(stop) = build_stop(record)? {
            documents.push(stop);
        }

        Ok(documents)
    }

    /// Attempts measurement extraction for one scan.
    ///
    /// A missing or unopenable data file is not an error: the scan still
    /// gets its `start`/`stop` pair from log data alone. A missing declared
    /// first column skips event generation for this scan only.
    fn extract_measurement(&mut self, record: &mut ScanRecord) -> ScandocResult<Vec<Document>> {
        let Some(data_file) = record.data_file.clone() else {
            return Ok(Vec::new());
        };
        let Some(measurement) = self.cache.record(&data_file, &record.number) else {
            return Ok(Vec::new());
        };

        record.record_stream_meta("start.SPEC.command", measurement.command.clone());
        match measurement.counting {
            Some(CountingBasis::Time(seconds)) => {
                record.record_stream_meta("start.SPEC.count_time", seconds);
            }
            Some(CountingBasis::Monitor(counts)) => {
                record.record_stream_meta("start.SPEC.count_monitor", counts);
            }
            None => {}
        }
        for (name, value) in &measurement.positioners {
            record.record_stream_meta(format!("start.positioners.{}", sanitize_name(name)), *value);
        }
        for (name, value) in &measurement.metadata {
            let clean = sanitize_name(name);
            record.record_stream_meta(format!("start.metadata.{clean}.value"), value.clone());
            record.record_stream_meta(format!("start.metadata.{clean}.name"), name.clone());
        }

        match MacroKind::from_command(&measurement.command) {
            MacroKind::ImageFrame => {
                // The bulk data lives in the image file named by the command.
                if let Some(image) = measurement.command.split_whitespace().nth(1) {
                    record.record_stream_meta("start.SPEC.hdf5_file", image);
                }
                Ok(Vec::new())
            }
            MacroKind::Fly => {
                for comment in &measurement.comments {
                    if let Some(position) = comment.find(FLY_FILE_MARKER) {
                        let path = comment[position + FLY_FILE_MARKER.len()..].trim_end();
                        record.record_stream_meta("start.SPEC.hdf5_file", path);
                        break;
                    }
                }
                Ok(Vec::new())
            }
            MacroKind::Step => match build_step_documents(measurement, record) {
                Ok(documents) => Ok(documents),
                Err(err) if err.kind() == ErrorKind::MissingDataColumn => {
                    warn!("skipping data extraction for scan `{}`: {}", record.id, err);
                    Ok(Vec::new())
                }
                Err(err) => Err(err),
            },
        }
    }
}

/// Builds the descriptor and per-observation event documents for a step scan.
fn build_step_documents(
    measurement: &MeasurementRecord,
    record: &mut ScanRecord,
) -> ScandocResult<Vec<Document>> {
    let Some(first_label) = measurement.labels.first() else {
        bail!(
            ErrorKind::MissingDataColumn,
            "Measurement record declares no data columns",
            format!("scan `{}`", record.id)
        );
    };
    let Some(first_column) = measurement.data.get(first_label) else {
        bail!(
            ErrorKind::MissingDataColumn,
            "Declared first data column is missing from the measurement record",
            format!("scan `{}`, column `{}`", record.id, first_label)
        );
    };
    let observations = first_column.len();

    let base_time = parse_timestamp(&measurement.date).map_err(|err| {
        scandoc_error!(
            ErrorKind::ConversionError,
            "Measurement record carries an unparseable date",
            format!("scan `{}`: {}", record.id, err)
        )
    })?;
    let descriptor_uid = Uuid::new_v4().simple().to_string();

    let mut data_keys = BTreeMap::new();
    for name in measurement.data.keys() {
        data_keys.insert(
            sanitize_name(name).into_owned(),
            DataKey::number(ProvenanceTag::classify(name, measurement), name.clone()),
        );
    }

    let mut documents = Vec::with_capacity(observations + 1);
    documents.push(Document::Descriptor(DescriptorDocument {
        time: base_time,
        uid: descriptor_uid.clone(),
        run_start: record.run_uid.clone(),
        data_keys,
        time_text: time_text(base_time),
    }));

    for index in 0..observations {
        let elapsed = measurement
            .elapsed
            .as_ref()
            .and_then(|column| column.get(index))
            .copied()
            .unwrap_or(0.0);
        let time = base_time + elapsed;

        let mut data = BTreeMap::new();
        let mut timestamps = BTreeMap::new();
        for (name, values) in &measurement.data {
            let Some(value) = values.get(index) else {
                continue;
            };
            let clean = sanitize_name(name).into_owned();
            timestamps.insert(clean.clone(), time);
            data.insert(clean, *value);
        }

        documents.push(Document::Event(EventDocument {
            time,
            uid: Uuid::new_v4().simple().to_string(),
            seq_num: (index + 1) as u64,
            descriptor: descriptor_uid.clone(),
            data,
            timestamps,
            time_text: time_text(time),
        }));
    }

    record.record_stream_meta("stop.num_events", observations as u64);

    Ok(documents)
}

/// Builds the `start` document for a scan record.
fn build_start(record: &ScanRecord) -> ScandocResult<Document> {
    let Some(started) = record.started.as_deref() else {
        bail!(
            ErrorKind::ConversionError,
            "Scan entry has no started timestamp",
            format!("scan `{}` in `{}`", record.id, record.source_log.display())
        );
    };
    let time = parse_timestamp(started).map_err(|err| {
        scandoc_error!(
            ErrorKind::ConversionError,
            "Scan entry has an unparseable started timestamp",
            format!(
                "scan `{}` in `{}`: {}",
                record.id,
                record.source_log.display(),
                err
            )
        )
    })?;

    let mut metadata = Map::new();
    metadata.insert(
        "SPEC".to_owned(),
        json!({
            "filename": record
                .data_file
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            "scan_number": record.number,
            "scan_macro": record.scan_type,
            "title": record.title,
        }),
    );
    merge_dotted(&record.stream_meta, DocumentKind::Start, &mut metadata);

    Ok(Document::Start(StartDocument {
        time,
        plan_name: record.scan_type.clone(),
        uid: record.run_uid.clone(),
        scan_id: record.number.clone(),
        time_text: started.to_owned(),
        scanlog_id: record.id.as_str().to_owned(),
        metadata,
    }))
}

/// Builds the `stop` document for a scan record, unless its state is unknown.
///
/// An unrecognized terminal state surfaces as an error rather than a guessed
/// exit status: it indicates either a new state value this converter does not
/// yet understand or a corrupt log.
fn build_stop(record: &ScanRecord) -> ScandocResult<Option<Document>> {
    let exit_status = match &record.state {
        ScanState::Unknown => return Ok(None),
        ScanState::Complete => "success",
        ScanState::Scanning => "aborted",
        ScanState::Other(state) => bail!(
            ErrorKind::UnmappedScanState,
            "Scan entry carries a state with no exit status mapping",
            format!(
                "scan `{}` in `{}`, state `{}`",
                record.id,
                record.source_log.display(),
                state
            )
        ),
    };

    let Some(ended) = record.ended.as_deref().or(record.started.as_deref()) else {
        bail!(
            ErrorKind::ConversionError,
            "Scan entry has no usable end timestamp",
            format!("scan `{}` in `{}`", record.id, record.source_log.display())
        );
    };
    let time = parse_timestamp(ended).map_err(|err| {
        scandoc_error!(
            ErrorKind::ConversionError,
            "Scan entry has an unparseable end timestamp",
            format!(
                "scan `{}` in `{}`: {}",
                record.id,
                record.source_log.display(),
                err
            )
        )
    })?;

    let mut metadata = Map::new();
    merge_dotted(&record.stream_meta, DocumentKind::Stop, &mut metadata);

    Ok(Some(Document::Stop(StopDocument {
        time,
        uid: Uuid::new_v4().simple().to_string(),
        run_start: record.run_uid.clone(),
        exit_status: exit_status.to_owned(),
        time_text: ended.to_owned(),
        scanlog_state: record.state.as_str().to_owned(),
        metadata,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_kind_image_frame() {
        assert_eq!(
            MacroKind::from_command("SAXS ./saxs/AgBeLAB6_0001.hdf 20 20 1 5 1"),
            MacroKind::ImageFrame
        );
        assert_eq!(
            MacroKind::from_command("WAXS ./waxs/frame_0002.hdf 10 10 1 1 1"),
            MacroKind::ImageFrame
        );
    }

    #[test]
    fn macro_kind_fly() {
        assert_eq!(
            MacroKind::from_command("FlyScan ar 8.76068 0 7.1442 2.5e-05"),
            MacroKind::Fly
        );
    }

    #[test]
    fn macro_kind_step_fallback() {
        assert_eq!(
            MacroKind::from_command("uascan ar 8.76 7.14 0.0001 125 1"),
            MacroKind::Step
        );
        assert_eq!(MacroKind::from_command(""), MacroKind::Step);
        // Names are matched exactly, not by prefix.
        assert_eq!(MacroKind::from_command("FlyScanX a b"), MacroKind::Step);
        assert_eq!(MacroKind::from_command("SAXSImaging x"), MacroKind::Step);
    }
}
