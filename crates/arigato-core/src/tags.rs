//! Tag normalization.
//!
//! The wire protocol has carried tags both as a single comma-joined string
//! and as a repeated form field. Both arrive here as an iterator of raw
//! values; each value is comma-split, trimmed, and emptied entries dropped,
//! preserving left-to-right order. Duplicates are kept as-is.

/// Normalize raw tag values into an ordered sequence of trimmed, non-empty
/// tag strings. Pure and idempotent.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(',')
                .map(|tag| tag.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}
