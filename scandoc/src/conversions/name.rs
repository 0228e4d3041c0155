use std::borrow::Cow;

/// Sanitizes a measurement field name for use as a document key.
///
/// Downstream archive consumers forbid commas, periods, whitespace, and
/// hyphens in field names, so each such character becomes an underscore.
/// Names that are already clean are returned without allocation.
pub fn sanitize_name(name: &str) -> Cow<'_, str> {
    if name
        .chars()
        .any(|c| matches!(c, ',' | '.' | '-') || c.is_whitespace())
    {
        Cow::Owned(
            name.chars()
                .map(|c| {
                    if matches!(c, ',' | '.' | '-') || c.is_whitespace() {
                        '_'
                    } else {
                        c
                    }
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(name)
    }
}
