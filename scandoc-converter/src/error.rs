use scandoc::error::ScandocError;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// Returns whether terminal output should include backtraces.
fn should_render_backtrace() -> bool {
    matches!(
        std::env::var("RUST_BACKTRACE").as_deref(),
        Ok("1") | Ok("full")
    )
}

/// Result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;

/// Captured backtrace wrapper for infrastructure error variants.
pub struct CapturedBacktrace(Backtrace);

impl CapturedBacktrace {
    /// Captures a new backtrace for an error variant.
    fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl fmt::Debug for CapturedBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for the converter binary.
///
/// Wraps [`ScandocError`] for conversion errors and provides variants for
/// infrastructure errors.
#[derive(Debug)]
pub enum ConverterError {
    /// Conversion pipeline error.
    Conversion(ScandocError),
    /// Configuration error.
    Config(Box<dyn Error + Send + Sync>, CapturedBacktrace),
    /// I/O error.
    Io(std::io::Error, CapturedBacktrace),
}

impl ConverterError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            ConverterError::Conversion(_) => "conversion error",
            ConverterError::Config(_, _) => "configuration error",
            ConverterError::Io(_, _) => "i/o error",
        }
    }

    /// Returns the backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        match self {
            ConverterError::Conversion(err) => err.backtrace(),
            ConverterError::Config(_, cb) => &cb.0,
            ConverterError::Io(_, cb) => &cb.0,
        }
    }

    /// Creates a configuration error from any boxed source.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        ConverterError::Config(Box::new(err), CapturedBacktrace::capture())
    }

    /// Returns a user-oriented report for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("conversion failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        let mut source = Error::source(self);
        let mut idx = 1usize;
        while let Some(err) = source {
            out.push_str(&format!("cause {idx}: {err}\n"));
            source = err.source();
            idx += 1;
        }

        if should_render_backtrace() {
            out.push_str("backtrace:\n");
            out.push_str(&self.backtrace().to_string());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }
}

impl fmt::Display for ConverterError {
    /// Renders a user-focused one-line description for terminal and log output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterError::Conversion(err) => write!(f, "{err}"),
            ConverterError::Config(source, _) => write!(f, "configuration error: {source}"),
            ConverterError::Io(source, _) => write!(f, "i/o error: {source}"),
        }
    }
}

impl Error for ConverterError {
    /// Returns the direct cause for this error variant.
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConverterError::Conversion(err) => err.source(),
            ConverterError::Config(source, _) => Some(source.as_ref()),
            ConverterError::Io(source, _) => Some(source),
        }
    }
}

impl From<ScandocError> for ConverterError {
    /// Converts a conversion error into the pipeline error variant.
    fn from(err: ScandocError) -> Self {
        ConverterError::Conversion(err)
    }
}

impl From<std::io::Error> for ConverterError {
    /// Converts an I/O error into an I/O error variant.
    fn from(err: std::io::Error) -> Self {
        ConverterError::Io(err, CapturedBacktrace::capture())
    }
}
