//! Error types and result definitions for scan-log conversion.
//!
//! Provides a kinded error system with captured diagnostic metadata for the
//! conversion pipeline. [`ScandocError`] carries a static description, optional
//! dynamic detail, an optional source error, and the callsite that created it.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for conversion operations using [`ScandocError`].
pub type ScandocResult<T> = Result<T, ScandocError>;

/// Specific categories of errors that can occur while converting scan logs.
///
/// The kinds follow the conversion's failure taxonomy: structural log errors
/// and unmapped terminal states are fatal, while measurement-source problems
/// are recoverable per scan.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Scan-log errors
    MalformedLogEntry,
    InvalidLogDocument,

    // Measurement-source errors
    SourceOpenFailed,
    MissingDataColumn,

    // Document construction errors
    UnmappedScanState,
    ConversionError,

    // IO & serialization errors
    IoError,
    SerializationError,
    DestinationIoError,

    // Configuration errors
    ConfigError,

    // Unknown / uncategorized
    Unknown,
}

/// Main error type for scan-log conversion operations.
///
/// A [`ScandocError`] is always a single failure: the pipeline is
/// single-threaded, so there is never more than one error in flight and no
/// aggregation layer is needed.
#[derive(Debug, Clone)]
pub struct ScandocError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

impl ScandocError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        self.backtrace.as_ref()
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches an originating [`error::Error`] and returns the modified instance.
    ///
    /// The stored source is preserved across clones and exposed via
    /// [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Creates a [`ScandocError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        ScandocError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }
}

impl fmt::Display for ScandocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = self.detail.as_deref() {
            write!(f, "\n  Detail:")?;
            for line in detail.lines() {
                if line.trim().is_empty() {
                    write!(f, "\n  ")?;
                } else {
                    write!(f, "\n    {line}")?;
                }
            }
        }

        Ok(())
    }
}

impl error::Error for ScandocError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source as &(dyn error::Error + 'static))
    }
}

/// Creates a [`ScandocError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for ScandocError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> ScandocError {
        ScandocError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`ScandocError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for ScandocError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> ScandocError {
        ScandocError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`std::io::Error`] to [`ScandocError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for ScandocError {
    #[track_caller]
    fn from(err: std::io::Error) -> ScandocError {
        let detail = err.to_string();
        let source = Arc::new(err);
        ScandocError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`serde_json::Error`] to [`ScandocError`] with the appropriate kind.
///
/// Serialization failures while writing the document stream map to
/// [`ErrorKind::SerializationError`]; I/O failures surfaced through the JSON
/// writer map to [`ErrorKind::DestinationIoError`].
impl From<serde_json::Error> for ScandocError {
    #[track_caller]
    fn from(err: serde_json::Error) -> ScandocError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (
                ErrorKind::DestinationIoError,
                "JSON I/O operation failed",
            ),
            _ => (ErrorKind::SerializationError, "JSON serialization failed"),
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        ScandocError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`roxmltree::Error`] to [`ScandocError`] with [`ErrorKind::InvalidLogDocument`].
impl From<roxmltree::Error> for ScandocError {
    #[track_caller]
    fn from(err: roxmltree::Error) -> ScandocError {
        let detail = err.to_string();
        let source = Arc::new(err);
        ScandocError::from_components(
            ErrorKind::InvalidLogDocument,
            Cow::Borrowed("Scan log is not a well-formed XML document"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`chrono::ParseError`] to [`ScandocError`] with [`ErrorKind::ConversionError`].
impl From<chrono::ParseError> for ScandocError {
    #[track_caller]
    fn from(err: chrono::ParseError) -> ScandocError {
        let detail = err.to_string();
        let source = Arc::new(err);
        ScandocError::from_components(
            ErrorKind::ConversionError,
            Cow::Borrowed("Datetime parsing failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`std::num::ParseIntError`] to [`ScandocError`] with [`ErrorKind::ConversionError`].
impl From<std::num::ParseIntError> for ScandocError {
    #[track_caller]
    fn from(err: std::num::ParseIntError) -> ScandocError {
        let detail = err.to_string();
        let source = Arc::new(err);
        ScandocError::from_components(
            ErrorKind::ConversionError,
            Cow::Borrowed("Integer parsing failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`std::num::ParseFloatError`] to [`ScandocError`] with [`ErrorKind::ConversionError`].
impl From<std::num::ParseFloatError> for ScandocError {
    #[track_caller]
    fn from(err: std::num::ParseFloatError) -> ScandocError {
        let detail = err.to_string();
        let source = Arc::new(err);
        ScandocError::from_components(
            ErrorKind::ConversionError,
            Cow::Borrowed("Float parsing failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}
