use chrono::{DateTime, NaiveDateTime};

use crate::bail;
use crate::error::{ErrorKind, ScandocResult};

/// Date-time layouts accepted from scan logs and measurement files.
///
/// Scan logs combine `date` and `time` attributes into `"%Y-%m-%d %H:%M:%S"`;
/// measurement files carry ctime-style dates such as `"Thu Oct 13 22:08:08 2014"`.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%a %b %e %H:%M:%S %Y",
];

/// Parses a date-time string into float seconds since the UNIX epoch.
///
/// All timestamps are interpreted as UTC so that re-running a conversion on a
/// different host yields identical documents.
pub fn parse_timestamp(text: &str) -> ScandocResult<f64> {
    let trimmed = text.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc().timestamp() as f64);
        }
    }

    bail!(
        ErrorKind::ConversionError,
        "Timestamp does not match any supported layout",
        format!("could not parse `{trimmed}`")
    );
}

/// Renders float epoch seconds as a human-readable UTC date-time string.
///
/// Whole seconds render without a fractional part; sub-second times carry
/// six fractional digits.
pub fn time_text(time: f64) -> String {
    let seconds = time.div_euclid(1.0) as i64;
    let nanos = (time.rem_euclid(1.0) * 1e9).round() as u32;
    let (seconds, nanos) = if nanos >= 1_000_000_000 {
        (seconds + 1, 0)
    } else {
        (seconds, nanos)
    };

    let rendered = DateTime::from_timestamp(seconds, nanos).unwrap_or_default();
    if nanos == 0 {
        rendered.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        rendered.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parse_timestamp_log_layout() {
        let t = parse_timestamp("2014-10-13 22:08:08").unwrap();
        assert_eq!(t, 1413238088.0);
    }

    #[test]
    fn parse_timestamp_iso_layout() {
        let t = parse_timestamp("2014-10-13T22:08:08").unwrap();
        assert_eq!(t, 1413238088.0);
    }

    #[test]
    fn parse_timestamp_ctime_layout() {
        let t = parse_timestamp("Mon Oct 13 22:08:08 2014").unwrap();
        assert_eq!(t, 1413238088.0);
    }

    #[test]
    fn parse_timestamp_surrounding_whitespace() {
        let t = parse_timestamp("  2014-10-13 22:08:08\n").unwrap();
        assert_eq!(t, 1413238088.0);
    }

    #[test]
    fn parse_timestamp_garbage() {
        let err = parse_timestamp("not a date").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ConversionError));
        assert!(err.to_string().contains("not a date"));
    }

    #[test]
    fn parse_timestamp_empty() {
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn time_text_whole_seconds() {
        assert_eq!(time_text(1413238088.0), "2014-10-13 22:08:08");
    }

    #[test]
    fn time_text_fractional_seconds() {
        assert_eq!(time_text(1413238088.5), "2014-10-13 22:08:08.500000");
    }

    #[test]
    fn time_text_round_trips_parse() {
        let t = parse_timestamp("2016-10-05 22:09:59").unwrap();
        assert_eq!(parse_timestamp(&time_text(t)).unwrap(), t);
    }
}
