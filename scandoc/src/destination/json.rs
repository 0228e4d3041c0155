use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::destination::base::Destination;
use crate::error::{ErrorKind, ScandocError, ScandocResult};
use crate::scandoc_error;
use crate::types::Document;

/// Destination that appends the document stream to one JSON file.
///
/// The output is a single JSON array of `[kind, body]` pairs, one pair per
/// line. The array opens lazily on the first batch and every batch is
/// written as it arrives, so the file grows incrementally and peak memory
/// stays bounded by one scan's documents. [`Destination::finish`] closes the
/// array; an empty run yields an empty array.
#[derive(Debug)]
pub struct JsonFileDestination {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    wrote_any: bool,
}

impl JsonFileDestination {
    /// Creates a destination writing to the given output path.
    ///
    /// An existing file at the path is truncated when the first batch (or
    /// `finish`) arrives.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            wrote_any: false,
        }
    }

    /// Opens the output file and the enclosing array on first use.
    fn ensure_writer(&mut self) -> ScandocResult<&mut BufWriter<File>> {
        if self.writer.is_none() {
            let file = File::create(&self.path).map_err(|err| sink_error_for(&self.path, err))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(b"[")
                .map_err(|err| sink_error_for(&self.path, err))?;
            self.writer = Some(writer);
        }

        Ok(self
            .writer
            .as_mut()
            .expect("writer was just created"))
    }
}

fn sink_error_for(path: &std::path::Path, err: std::io::Error) -> ScandocError {
    scandoc_error!(
        ErrorKind::DestinationIoError,
        "Failed to write the document stream",
        detail = format!("file `{}`", path.display()),
        source: err
    )
}

impl Destination for JsonFileDestination {
    fn name() -> &'static str {
        "json-file"
    }

    fn write_documents(&mut self, documents: Vec<Document>) -> ScandocResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut first = !self.wrote_any;
        let path = self.path.clone();
        let writer = self.ensure_writer()?;
        for document in &documents {
            let separator: &[u8] = if first { b"\n" } else { b",\n" };
            first = false;
            writer
                .write_all(separator)
                .map_err(|err| sink_error_for(&path, err))?;
            serde_json::to_writer(&mut *writer, document)?;
        }
        self.wrote_any = true;

        Ok(())
    }

    fn finish(&mut self) -> ScandocResult<()> {
        let path = self.path.clone();
        let writer = self.ensure_writer()?;
        writer
            .write_all(b"\n]\n")
            .and_then(|_| writer.flush())
            .map_err(|err| sink_error_for(&path, err))?;

        Ok(())
    }
}
