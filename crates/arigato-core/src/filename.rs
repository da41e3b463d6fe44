//! Filename sanitization for uploaded files.
//!
//! Client-supplied filenames are untrusted: they may carry directory
//! components, NUL bytes, or characters that are unsafe as storage names.
//! The sanitized name, joined with the storage root, can never escape it.

use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// Map an arbitrary client-supplied filename to a safe storage name.
///
/// Directory components (both separator styles) are stripped, NUL bytes
/// dropped, and any character outside `[A-Za-z0-9._-]` is replaced with `_`.
/// Leading and trailing dots are trimmed so `.` / `..` cannot survive as a
/// whole name. An empty result is a validation error, not a fallback name.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let name_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let sanitized: String = name_only
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LENGTH)
        .collect();

    let trimmed = sanitized.trim_matches('.');
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Filename '{}' is empty after sanitization",
            filename
        )));
    }

    Ok(trimmed.to_string())
}
