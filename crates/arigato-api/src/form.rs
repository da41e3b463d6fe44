//! Multipart request decoding for image create/update.
//!
//! Field names are enumerated here; there is no prefix scanning over
//! arbitrary form keys. Repeated fields (`tags`, `sub_images`,
//! `new_author_sns_urls`) follow the declared repeatable-field convention,
//! and per-sub-image background flags are indexed
//! (`sub_image_has_background_{index}`), bound to upload position.

use std::collections::BTreeMap;

use arigato_core::models::{Author, NewAuthor};
use arigato_core::{normalize_tags, sanitize_filename, AppError};
use axum::extract::multipart::Field;
use axum::extract::Multipart;

use crate::state::DbState;

/// An uploaded file as received: client-supplied filename plus raw bytes.
/// The filename is untrusted until it has been through `prepare_filename`.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Resolved author reference from the two-branch rule: an existing id, or a
/// new name to create-then-use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    Existing(i64),
    New(String),
}

/// Decoded create/update form. Every field is optional at this level;
/// handlers enforce which ones their operation requires.
#[derive(Default)]
pub struct ImageForm {
    author_id: Option<String>,
    new_author_name: Option<String>,
    pub new_author_sns_urls: Vec<String>,
    raw_tags: Vec<String>,
    pub comments: Option<String>,
    pub main_image: Option<UploadedFile>,
    pub main_image_has_background: Option<bool>,
    pub sub_images: Vec<UploadedFile>,
    sub_image_flags: BTreeMap<usize, bool>,
}

/// Boolean-as-string wire convention: "true" is true, anything else false.
fn parse_bool(value: &str) -> bool {
    value == "true"
}

async fn text_value(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read form field: {}", e)))
}

async fn file_value(field: Field<'_>, max_file_size: usize) -> Result<UploadedFile, AppError> {
    let name = field.name().map(|s| s.to_string()).unwrap_or_default();
    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::InvalidInput(format!("Field '{}' must be a file upload", name)))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

    if data.len() > max_file_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File '{}' exceeds maximum allowed size of {} MB",
            filename,
            max_file_size / 1024 / 1024
        )));
    }

    Ok(UploadedFile {
        filename,
        data: data.to_vec(),
    })
}

impl ImageForm {
    /// Decode a multipart body. Unrecognized fields are ignored; file reads
    /// are sequential so sub-image order matches upload order.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_file_size: usize,
    ) -> Result<Self, AppError> {
        let mut form = ImageForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
        {
            let name = field.name().map(|s| s.to_string()).unwrap_or_default();

            match name.as_str() {
                "main_image" => {
                    form.main_image = Some(file_value(field, max_file_size).await?);
                }
                "sub_images" => {
                    form.sub_images.push(file_value(field, max_file_size).await?);
                }
                "author_id" => {
                    form.author_id = Some(text_value(field).await?);
                }
                // "author_name" is the flat-variant alias for a new author name
                "new_author_name" | "author_name" => {
                    form.new_author_name = Some(text_value(field).await?);
                }
                "new_author_sns_urls" => {
                    form.new_author_sns_urls.push(text_value(field).await?);
                }
                "tags" => {
                    form.raw_tags.push(text_value(field).await?);
                }
                "comments" => {
                    form.comments = Some(text_value(field).await?);
                }
                "main_image_has_background" => {
                    form.main_image_has_background = Some(parse_bool(&text_value(field).await?));
                }
                other => {
                    if let Some(suffix) = other.strip_prefix("sub_image_has_background_") {
                        if let Ok(index) = suffix.parse::<usize>() {
                            form.sub_image_flags
                                .insert(index, parse_bool(&text_value(field).await?));
                        }
                    }
                }
            }
        }

        Ok(form)
    }

    /// Two-branch author resolution rule: an `author_id` that parses as an
    /// integer wins; otherwise a new-author name; an unparseable id with no
    /// name fallback is malformed. `None` means no author reference at all.
    pub fn author_ref(&self) -> Result<Option<AuthorRef>, AppError> {
        if let Some(raw) = &self.author_id {
            if let Ok(id) = raw.trim().parse::<i64>() {
                return Ok(Some(AuthorRef::Existing(id)));
            }
        }

        if let Some(name) = &self.new_author_name {
            return Ok(Some(AuthorRef::New(name.clone())));
        }

        if self.author_id.is_some() {
            return Err(AppError::InvalidInput(
                "author_id is not a valid integer and no new author name was given".to_string(),
            ));
        }

        Ok(None)
    }

    /// Whether the request carried a tags field at all. Distinguishes
    /// "replace with empty" from "leave untouched" on update.
    pub fn tags_provided(&self) -> bool {
        !self.raw_tags.is_empty()
    }

    pub fn normalized_tags(&self) -> Vec<String> {
        normalize_tags(&self.raw_tags)
    }

    /// Background flag for the sub-image at `index`; absent flags are false.
    pub fn sub_image_flag(&self, index: usize) -> bool {
        self.sub_image_flags.get(&index).copied().unwrap_or(false)
    }
}

/// Sanitize a client filename and check its extension against the allowlist.
/// Runs before any file write so a bad name rejects the request up front.
pub fn prepare_filename(raw: &str, allowed_extensions: &[String]) -> Result<String, AppError> {
    let sanitized = sanitize_filename(raw)?;

    let extension = sanitized.rsplit('.').next().unwrap_or("").to_lowercase();
    if extension == sanitized.to_lowercase() || !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(sanitized)
}

/// Resolve an author reference against the repository: find an existing
/// author by id, or create a new one (with the supplied SNS links) by name.
pub async fn resolve_author(
    db: &DbState,
    author_ref: AuthorRef,
    sns_urls: Vec<String>,
) -> Result<Author, AppError> {
    match author_ref {
        AuthorRef::Existing(id) => db.author_repository.find_by_id(id).await,
        AuthorRef::New(name) => {
            db.author_repository
                .create(NewAuthor { name, sns_urls })
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string()]
    }

    #[test]
    fn parse_bool_only_accepts_true() {
        assert!(parse_bool("true"));
        assert!(!parse_bool("True"));
        assert!(!parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn author_ref_prefers_numeric_id() {
        let form = ImageForm {
            author_id: Some("42".to_string()),
            new_author_name: Some("ayame".to_string()),
            ..Default::default()
        };
        assert_eq!(form.author_ref().unwrap(), Some(AuthorRef::Existing(42)));
    }

    #[test]
    fn author_ref_falls_back_to_new_name() {
        let form = ImageForm {
            new_author_name: Some("ayame".to_string()),
            ..Default::default()
        };
        assert_eq!(
            form.author_ref().unwrap(),
            Some(AuthorRef::New("ayame".to_string()))
        );

        // Unparseable id with a name falls through to the name branch
        let form = ImageForm {
            author_id: Some("abc".to_string()),
            new_author_name: Some("ayame".to_string()),
            ..Default::default()
        };
        assert_eq!(
            form.author_ref().unwrap(),
            Some(AuthorRef::New("ayame".to_string()))
        );
    }

    #[test]
    fn author_ref_rejects_malformed_reference() {
        let form = ImageForm {
            author_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(form.author_ref().is_err());
    }

    #[test]
    fn author_ref_absent_is_none() {
        let form = ImageForm::default();
        assert_eq!(form.author_ref().unwrap(), None);
    }

    #[test]
    fn tags_presence_and_normalization() {
        let form = ImageForm::default();
        assert!(!form.tags_provided());

        let form = ImageForm {
            raw_tags: vec!["a, b ,,c".to_string(), "d".to_string()],
            ..Default::default()
        };
        assert!(form.tags_provided());
        assert_eq!(form.normalized_tags(), vec!["a", "b", "c", "d"]);

        // An empty tags value still counts as "provided": replace with empty
        let form = ImageForm {
            raw_tags: vec!["".to_string()],
            ..Default::default()
        };
        assert!(form.tags_provided());
        assert!(form.normalized_tags().is_empty());
    }

    #[test]
    fn sub_image_flags_default_to_false() {
        let mut form = ImageForm::default();
        form.sub_image_flags.insert(0, true);
        assert!(form.sub_image_flag(0));
        assert!(!form.sub_image_flag(1));
    }

    #[test]
    fn prepare_filename_checks_extension() {
        assert_eq!(prepare_filename("a.png", &allowed()).unwrap(), "a.png");
        assert_eq!(prepare_filename("A.PNG", &allowed()).unwrap(), "A.PNG");
        assert!(prepare_filename("a.exe", &allowed()).is_err());
        assert!(prepare_filename("noextension", &allowed()).is_err());
    }

    #[test]
    fn prepare_filename_strips_traversal() {
        assert_eq!(
            prepare_filename("../../uploads/a.png", &allowed()).unwrap(),
            "a.png"
        );
        assert!(prepare_filename("../..", &allowed()).is_err());
    }
}
