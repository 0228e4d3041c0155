//! File-backed measurement source for the legacy columnar format.
//!
//! Implements the [`SourceOpener`]/[`MeasurementSource`] seam over classic
//! control-line data files: `#F`/`#E` preamble, `#O`/`#o` positioner and
//! `#J`/`#j` counter naming tables and `#H` metadata labels in the header,
//! then per-scan `#S`/`#D`/`#T`/`#M`/`#P`/`#V`/`#C`/`#L` control lines with
//! whitespace-separated numeric data rows. The format's own full parser is
//! an external concern; this reader covers what the conversion consumes.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use scandoc::error::{ErrorKind, ScandocResult};
use scandoc::measurement::{
    CountingBasis, MeasurementRecord, MeasurementSource, NamingTables, SourceOpener,
};
use scandoc::{bail, scandoc_error};

/// Column whose values double as per-row elapsed seconds.
const ELAPSED_COLUMN: &str = "Epoch";

/// One parsed measurement file, indexed by scan number.
#[derive(Debug)]
pub struct SpecDataFile {
    path: PathBuf,
    scans: HashMap<String, MeasurementRecord>,
}

impl MeasurementSource for SpecDataFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, scan_number: &str) -> Option<&MeasurementRecord> {
        self.scans.get(scan_number)
    }
}

/// Opens legacy measurement files from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecFileOpener;

impl SourceOpener for SpecFileOpener {
    type Source = SpecDataFile;

    fn open(&self, path: &Path) -> ScandocResult<SpecDataFile> {
        let text = fs::read_to_string(path).map_err(|err| {
            scandoc_error!(
                ErrorKind::SourceOpenFailed,
                "Failed to read measurement file",
                detail = format!("file `{}`", path.display()),
                source: err
            )
        })?;

        parse_spec_file(path, &text)
    }
}

/// Scan-section state accumulated while walking a file's lines.
#[derive(Debug, Default)]
struct ScanSection {
    number: String,
    command: String,
    date: String,
    comments: Vec<String>,
    labels: Vec<String>,
    rows: Vec<Vec<f64>>,
    positioner_values: Vec<f64>,
    metadata_values: Vec<String>,
    counting: Option<CountingBasis>,
}

fn parse_spec_file(path: &Path, text: &str) -> ScandocResult<SpecDataFile> {
    let Some(first_line) = text.lines().find(|line| !line.trim().is_empty()) else {
        bail!(
            ErrorKind::SourceOpenFailed,
            "Measurement file is empty",
            format!("file `{}`", path.display())
        );
    };
    if !(first_line.starts_with("#F") || first_line.starts_with("#E") || first_line.starts_with("#S"))
    {
        bail!(
            ErrorKind::SourceOpenFailed,
            "Not a valid measurement file",
            format!("file `{}` has no control-line preamble", path.display())
        );
    }

    let mut naming = NamingTables::default();
    let mut metadata_labels: Vec<String> = Vec::new();
    let mut scans = HashMap::new();
    let mut section: Option<ScanSection> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("#S ") {
            if let Some(done) = section.take() {
                finalize_scan(done, &naming, &metadata_labels, &mut scans);
            }

            let rest = rest.trim();
            let (number, command) = match rest.split_once(char::is_whitespace) {
                Some((number, command)) => (number.to_owned(), command.trim().to_owned()),
                None => (rest.to_owned(), String::new()),
            };
            section = Some(ScanSection {
                number,
                command,
                ..ScanSection::default()
            });
            continue;
        }

        // Header naming tables accumulate wherever they appear.
        if let Some(names) = numbered_control(line, "#O") {
            naming.positioner_names.extend(split_double_space(names));
            continue;
        }
        if let Some(names) = numbered_control(line, "#o") {
            naming
                .positioner_mnemonics
                .extend(names.split_whitespace().map(str::to_owned));
            continue;
        }
        if let Some(names) = numbered_control(line, "#J") {
            naming.counter_names.extend(split_double_space(names));
            continue;
        }
        if let Some(names) = numbered_control(line, "#j") {
            naming
                .counter_mnemonics
                .extend(names.split_whitespace().map(str::to_owned));
            continue;
        }
        if let Some(labels) = numbered_control(line, "#H") {
            metadata_labels.extend(split_double_space(labels));
            continue;
        }

        let Some(scan) = section.as_mut() else {
            continue;
        };

        if let Some(date) = line.strip_prefix("#D ") {
            if scan.date.is_empty() {
                scan.date = date.trim().to_owned();
            }
        } else if let Some(value) = line.strip_prefix("#T ") {
            scan.counting = parse_count(value).map(CountingBasis::Time);
        } else if let Some(value) = line.strip_prefix("#M ") {
            scan.counting = parse_count(value).map(CountingBasis::Monitor);
        } else if let Some(comment) = line.strip_prefix("#C") {
            scan.comments.push(comment.trim_start().to_owned());
        } else if let Some(values) = numbered_control(line, "#P") {
            scan.positioner_values.extend(
                values
                    .split_whitespace()
                    .filter_map(|value| value.parse::<f64>().ok()),
            );
        } else if let Some(values) = numbered_control(line, "#V") {
            scan.metadata_values
                .extend(values.split_whitespace().map(str::to_owned));
        } else if let Some(labels) = line.strip_prefix("#L ") {
            scan.labels = split_double_space(labels);
        } else if !line.starts_with('#') && !line.trim().is_empty() {
            let row: Vec<f64> = line
                .split_whitespace()
                .filter_map(|value| value.parse::<f64>().ok())
                .collect();
            if !row.is_empty() {
                scan.rows.push(row);
            }
        }
    }

    if let Some(done) = section.take() {
        finalize_scan(done, &naming, &metadata_labels, &mut scans);
    }

    Ok(SpecDataFile {
        path: path.to_path_buf(),
        scans,
    })
}

/// Converts an accumulated scan section into a [`MeasurementRecord`].
fn finalize_scan(
    section: ScanSection,
    naming: &NamingTables,
    metadata_labels: &[String],
    scans: &mut HashMap<String, MeasurementRecord>,
) {
    let mut data: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (index, label) in section.labels.iter().enumerate() {
        let column: Vec<f64> = section
            .rows
            .iter()
            .filter_map(|row| row.get(index).copied())
            .collect();
        data.insert(label.clone(), column);
    }

    let elapsed = data.get(ELAPSED_COLUMN).cloned();

    let positioners: BTreeMap<String, f64> = naming
        .positioner_names
        .iter()
        .zip(section.positioner_values.iter())
        .map(|(name, value)| (name.clone(), *value))
        .collect();

    let metadata: BTreeMap<String, String> = metadata_labels
        .iter()
        .zip(section.metadata_values.iter())
        .map(|(label, value)| (label.clone(), value.clone()))
        .collect();

    scans.insert(
        section.number.clone(),
        MeasurementRecord {
            command: section.command,
            date: section.date,
            comments: section.comments,
            labels: section.labels,
            data,
            elapsed,
            positioners,
            metadata,
            counting: section.counting,
            naming: naming.clone(),
        },
    );
}

/// Strips a numbered control tag (`#O0`, `#P3`, ...) and returns its payload.
fn numbered_control<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.starts_with(' ') || rest.starts_with('\t') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Splits a control-line payload on double spaces, keeping single-space names
/// such as `H K L` intact.
fn split_double_space(text: &str) -> Vec<String> {
    text.split("  ")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parses the numeric portion of a `#T`/`#M` counting line.
fn parse_count(value: &str) -> Option<f64> {
    value
        .split_whitespace()
        .next()
        .and_then(|count| count.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_FILE: &str = "\
#F /share1/data/10_13.dat
#E 1413238088
#D Mon Oct 13 22:08:08 2014
#O0 SampleY  ar  Delta Theta
#o0 sy ar dth
#J0 I0  seconds
#j0 I0 sec
#H0 DCM_energy  SR_current

#S 125 uascan ar 8.76 7.14 0.0001 125 1
#D Mon Oct 13 22:08:08 2014
#T 1 (seconds)
#P0 12.5 8.76 0.25
#V0 11.871
#C regular step scan
#N 3
#L ar  H K L  Epoch
8.76 0.0 0
8.75 0.5 1
8.74 1.0 2

#S 126 FlyScan ar 8.76068 0 7.1442 2.5e-05
#D Mon Oct 13 22:10:26 2014
#M 10000 (I0)
#C FlyScan file name = /share1/usaxs.h5
";

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn open_rejects_files_without_preamble() {
        let file = write_file("just some text\nwith no control lines\n");
        let err = SpecFileOpener.open(file.path()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SourceOpenFailed));
    }

    #[test]
    fn open_rejects_empty_files() {
        let file = write_file("\n\n");
        let err = SpecFileOpener.open(file.path()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::SourceOpenFailed));
    }

    #[test]
    fn open_rejects_missing_files() {
        assert!(SpecFileOpener.open(Path::new("/nonexistent/file.dat")).is_err());
    }

    #[test]
    fn parses_scans_by_number() {
        let file = write_file(SAMPLE_FILE);
        let source = SpecFileOpener.open(file.path()).unwrap();

        assert!(source.record("125").is_some());
        assert!(source.record("126").is_some());
        assert!(source.record("127").is_none());
    }

    #[test]
    fn parses_command_date_and_counting() {
        let file = write_file(SAMPLE_FILE);
        let source = SpecFileOpener.open(file.path()).unwrap();

        let scan = source.record("125").unwrap();
        assert_eq!(scan.command, "uascan ar 8.76 7.14 0.0001 125 1");
        assert_eq!(scan.date, "Mon Oct 13 22:08:08 2014");
        assert_eq!(scan.counting, Some(CountingBasis::Time(1.0)));

        let fly = source.record("126").unwrap();
        assert_eq!(fly.counting, Some(CountingBasis::Monitor(10000.0)));
        assert_eq!(fly.comments, vec!["FlyScan file name = /share1/usaxs.h5"]);
    }

    #[test]
    fn parses_columns_with_double_space_labels() {
        let file = write_file(SAMPLE_FILE);
        let source = SpecFileOpener.open(file.path()).unwrap();

        let scan = source.record("125").unwrap();
        assert_eq!(scan.labels, vec!["ar", "H K L", "Epoch"]);
        assert_eq!(scan.data["ar"], vec![8.76, 8.75, 8.74]);
        assert_eq!(scan.data["H K L"], vec![0.0, 0.5, 1.0]);
        assert_eq!(scan.elapsed, Some(vec![0.0, 1.0, 2.0]));
    }

    #[test]
    fn parses_naming_tables_and_positioners() {
        let file = write_file(SAMPLE_FILE);
        let source = SpecFileOpener.open(file.path()).unwrap();

        let scan = source.record("125").unwrap();
        assert_eq!(
            scan.naming.positioner_names,
            vec!["SampleY", "ar", "Delta Theta"]
        );
        assert_eq!(scan.naming.positioner_mnemonics, vec!["sy", "ar", "dth"]);
        assert_eq!(scan.naming.counter_names, vec!["I0", "seconds"]);
        assert_eq!(scan.naming.counter_mnemonics, vec!["I0", "sec"]);

        assert_eq!(scan.positioners["SampleY"], 12.5);
        assert_eq!(scan.positioners["ar"], 8.76);
        assert_eq!(scan.positioners["Delta Theta"], 0.25);
    }

    #[test]
    fn zips_metadata_labels_with_values() {
        let file = write_file(SAMPLE_FILE);
        let source = SpecFileOpener.open(file.path()).unwrap();

        let scan = source.record("125").unwrap();
        assert_eq!(scan.metadata["DCM_energy"], "11.871");
        // No #V line in the fly scan, so no metadata there.
        assert!(source.record("126").unwrap().metadata.is_empty());
    }

    #[test]
    fn repeated_scan_number_keeps_the_last_occurrence() {
        let file = write_file(
            "#F a.dat\n#S 1 ascan a\n#D Mon Oct 13 22:08:08 2014\n#S 1 ascan b\n#D Mon Oct 13 22:09:08 2014\n",
        );
        let source = SpecFileOpener.open(file.path()).unwrap();
        assert_eq!(source.record("1").unwrap().command, "ascan b");
    }

    #[test]
    fn metadata_labels_missing_header_yield_empty_metadata() {
        let file = write_file("#F a.dat\n#S 1 ascan a\n#V0 1.0 2.0\n");
        let source = SpecFileOpener.open(file.path()).unwrap();
        assert!(source.record("1").unwrap().metadata.is_empty());
    }
}
