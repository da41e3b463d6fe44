//! Image record domain model, its create/update inputs, and the public view
//! projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::author::{Author, AuthorResponse};

#[cfg(feature = "sqlx")]
use sqlx::types::Json;
#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// A stored sub-image: sanitized filename plus its background flag.
/// The flag is bound to the upload position, not the filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubImage {
    pub filename: String,
    pub has_background: bool,
}

/// An image record. `sub_images` and `tags` are always present, possibly
/// empty; `main_image_path` is the sanitized stored filename and is never
/// empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub author_id: i64,
    pub main_image_path: String,
    pub main_image_has_background: bool,
    pub sub_images: Vec<SubImage>,
    pub tags: Vec<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an image record. The author must already be resolved
/// to an id and the main image already stored.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub author_id: i64,
    pub main_image_path: String,
    pub main_image_has_background: bool,
    pub sub_images: Vec<SubImage>,
    pub tags: Vec<String>,
    pub comments: Option<String>,
}

/// Partial update for an image record. `None` fields are left untouched;
/// `Some` fields fully replace the stored value (tags and the sub-image
/// list are replaced wholesale, never merged).
#[derive(Debug, Clone, Default)]
pub struct UpdateImage {
    pub author_id: Option<i64>,
    pub main_image_path: Option<String>,
    pub main_image_has_background: Option<bool>,
    pub sub_images: Option<Vec<SubImage>>,
    pub tags: Option<Vec<String>>,
    pub comments: Option<String>,
}

/// Database row for an image record. `sub_images` and `tags` are JSON
/// arrays stored as TEXT.
#[cfg(feature = "sqlx")]
#[derive(Debug, FromRow)]
pub struct ImageRow {
    pub id: i64,
    pub author_id: i64,
    pub main_image_path: String,
    pub main_image_has_background: bool,
    pub sub_images: Json<Vec<SubImage>>,
    pub tags: Json<Vec<String>>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl ImageRow {
    pub fn into_record(self) -> ImageRecord {
        ImageRecord {
            id: self.id,
            author_id: self.author_id,
            main_image_path: self.main_image_path,
            main_image_has_background: self.main_image_has_background,
            sub_images: self.sub_images.0,
            tags: self.tags.0,
            comments: self.comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A projected sub-image entry: public path plus background flag.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubImageView {
    pub filename: String,
    pub has_background: bool,
}

/// Public image view. Stored filenames are replaced with public paths at
/// read time; the paths themselves are never persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: i64,
    pub author: AuthorResponse,
    pub main_image_path: String,
    pub main_image_has_background: bool,
    pub sub_image_paths: Vec<SubImageView>,
    pub tags: Vec<String>,
    pub comments: Option<String>,
}

/// Join a stored filename with the public prefix.
fn public_path(prefix: &str, filename: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), filename)
}

impl ImageResponse {
    /// Project a stored record (plus its author) into the public view.
    pub fn project(record: ImageRecord, author: Author, prefix: &str) -> Self {
        ImageResponse {
            id: record.id,
            author: AuthorResponse::from(author),
            main_image_path: public_path(prefix, &record.main_image_path),
            main_image_has_background: record.main_image_has_background,
            sub_image_paths: record
                .sub_images
                .into_iter()
                .map(|sub| SubImageView {
                    filename: public_path(prefix, &sub.filename),
                    has_background: sub.has_background,
                })
                .collect(),
            tags: record.tags,
            comments: record.comments,
        }
    }
}
