use std::collections::HashMap;

use arigato_core::models::{Author, AuthorRow, ImageRecord, ImageRow, NewImage, UpdateImage};
use arigato_core::AppError;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool};

/// Image repository
///
/// Owns `ImageRecord` rows. Every record references an existing author; the
/// reference is verified here before insert/update so a dangling id surfaces
/// as a not-found error instead of a constraint failure.
#[derive(Clone)]
pub struct ImageRepository {
    pool: SqlitePool,
}

impl ImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_author_exists(&self, author_id: i64) -> Result<(), AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM authors WHERE id = ?")
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!(
                "Author {} not found",
                author_id
            ))),
        }
    }

    #[tracing::instrument(skip(self, new_image), fields(db.table = "images", db.operation = "insert"))]
    pub async fn create(&self, new_image: NewImage) -> Result<ImageRecord, AppError> {
        self.ensure_author_exists(new_image.author_id).await?;

        let now = Utc::now();
        let row: ImageRow = sqlx::query_as::<Sqlite, ImageRow>(
            r#"
            INSERT INTO images (
                author_id, main_image_path, main_image_has_background,
                sub_images, tags, comments, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_image.author_id)
        .bind(&new_image.main_image_path)
        .bind(new_image.main_image_has_background)
        .bind(Json(&new_image.sub_images))
        .bind(Json(&new_image.tags))
        .bind(&new_image.comments)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record())
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    pub async fn get(&self, id: i64) -> Result<Option<ImageRecord>, AppError> {
        let row: Option<ImageRow> =
            sqlx::query_as::<Sqlite, ImageRow>("SELECT * FROM images WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(ImageRow::into_record))
    }

    /// Fetch one record together with its author.
    pub async fn get_with_author(&self, id: i64) -> Result<Option<(ImageRecord, Author)>, AppError> {
        let Some(record) = self.get(id).await? else {
            return Ok(None);
        };

        let author_row: Option<AuthorRow> =
            sqlx::query_as::<Sqlite, AuthorRow>("SELECT * FROM authors WHERE id = ?")
                .bind(record.author_id)
                .fetch_optional(&self.pool)
                .await?;

        let author = author_row.map(AuthorRow::into_author).ok_or_else(|| {
            AppError::Internal(format!(
                "Author {} not found for image {}",
                record.author_id, record.id
            ))
        })?;

        Ok(Some((record, author)))
    }

    /// All records joined with their authors, ordered by id ascending.
    /// Authors are fetched in one query to avoid per-row lookups.
    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    pub async fn list_with_authors(&self) -> Result<Vec<(ImageRecord, Author)>, AppError> {
        let rows: Vec<ImageRow> =
            sqlx::query_as::<Sqlite, ImageRow>("SELECT * FROM images ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        let author_rows: Vec<AuthorRow> =
            sqlx::query_as::<Sqlite, AuthorRow>("SELECT * FROM authors")
                .fetch_all(&self.pool)
                .await?;
        let authors: HashMap<i64, Author> = author_rows
            .into_iter()
            .map(|row| {
                let author = row.into_author();
                (author.id, author)
            })
            .collect();

        rows.into_iter()
            .map(|row| {
                let record = row.into_record();
                let author = authors.get(&record.author_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!(
                        "Author {} not found for image {}",
                        record.author_id, record.id
                    ))
                })?;
                Ok((record, author))
            })
            .collect()
    }

    /// Partial-field merge: only `Some` fields overwrite stored values.
    /// Tags and the sub-image list are replaced wholesale when present.
    #[tracing::instrument(skip(self, update), fields(db.table = "images", db.operation = "update"))]
    pub async fn update(&self, id: i64, update: UpdateImage) -> Result<ImageRecord, AppError> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", id)))?;

        if let Some(author_id) = update.author_id {
            self.ensure_author_exists(author_id).await?;
        }

        let author_id = update.author_id.unwrap_or(existing.author_id);
        let main_image_path = update
            .main_image_path
            .unwrap_or(existing.main_image_path);
        let main_image_has_background = update
            .main_image_has_background
            .unwrap_or(existing.main_image_has_background);
        let sub_images = update.sub_images.unwrap_or(existing.sub_images);
        let tags = update.tags.unwrap_or(existing.tags);
        let comments = update.comments.or(existing.comments);

        let row: ImageRow = sqlx::query_as::<Sqlite, ImageRow>(
            r#"
            UPDATE images
            SET author_id = ?, main_image_path = ?, main_image_has_background = ?,
                sub_images = ?, tags = ?, comments = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(author_id)
        .bind(&main_image_path)
        .bind(main_image_has_background)
        .bind(Json(&sub_images))
        .bind(Json(&tags))
        .bind(&comments)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record())
    }

    /// Remove the record. Stored blob files are not deleted here.
    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "delete"))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Image {} not found", id)));
        }

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::authors::AuthorRepository;
    use arigato_core::models::{NewAuthor, SubImage};

    async fn test_repos() -> (AuthorRepository, ImageRepository) {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        (
            AuthorRepository::new(pool.clone()),
            ImageRepository::new(pool),
        )
    }

    async fn seed_author(authors: &AuthorRepository) -> i64 {
        authors
            .create(NewAuthor {
                name: "ayame".to_string(),
                sns_urls: vec![],
            })
            .await
            .unwrap()
            .id
    }

    fn new_image(author_id: i64) -> NewImage {
        NewImage {
            author_id,
            main_image_path: "a.png".to_string(),
            main_image_has_background: false,
            sub_images: vec![
                SubImage {
                    filename: "s0.png".to_string(),
                    has_background: true,
                },
                SubImage {
                    filename: "s1.png".to_string(),
                    has_background: false,
                },
            ],
            tags: vec!["cat".to_string(), "ink".to_string()],
            comments: Some("thanks!".to_string()),
        }
    }

    #[tokio::test]
    async fn create_round_trips_json_columns() {
        let (authors, images) = test_repos().await;
        let author_id = seed_author(&authors).await;

        let created = images.create(new_image(author_id)).await.unwrap();
        let fetched = images.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.main_image_path, "a.png");
        assert_eq!(fetched.sub_images.len(), 2);
        assert!(fetched.sub_images[0].has_background);
        assert!(!fetched.sub_images[1].has_background);
        assert_eq!(fetched.tags, vec!["cat", "ink"]);
        assert_eq!(fetched.comments.as_deref(), Some("thanks!"));
    }

    #[tokio::test]
    async fn create_with_unknown_author_is_not_found() {
        let (_, images) = test_repos().await;
        let err = images.create(new_image(42)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(images.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_replaces_only_present_fields() {
        let (authors, images) = test_repos().await;
        let author_id = seed_author(&authors).await;
        let created = images.create(new_image(author_id)).await.unwrap();

        let updated = images
            .update(
                created.id,
                UpdateImage {
                    tags: Some(vec!["new".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.tags, vec!["new"]);
        assert_eq!(updated.main_image_path, created.main_image_path);
        assert_eq!(updated.sub_images, created.sub_images);
        assert_eq!(updated.comments, created.comments);
        assert_eq!(updated.author_id, created.author_id);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_replaces_sub_images_wholesale() {
        let (authors, images) = test_repos().await;
        let author_id = seed_author(&authors).await;
        let created = images.create(new_image(author_id)).await.unwrap();

        let replacement = vec![SubImage {
            filename: "only.png".to_string(),
            has_background: false,
        }];
        let updated = images
            .update(
                created.id,
                UpdateImage {
                    sub_images: Some(replacement.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.sub_images, replacement);
    }

    #[tokio::test]
    async fn update_missing_image_is_not_found() {
        let (_, images) = test_repos().await;
        let err = images
            .update(999_999, UpdateImage::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_then_get_is_gone() {
        let (authors, images) = test_repos().await;
        let author_id = seed_author(&authors).await;
        let created = images.create(new_image(author_id)).await.unwrap();

        images.delete(created.id).await.unwrap();
        assert!(images.get(created.id).await.unwrap().is_none());
        assert!(matches!(
            images.delete(created.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn list_with_authors_joins_and_orders() {
        let (authors, images) = test_repos().await;
        let author_id = seed_author(&authors).await;

        images.create(new_image(author_id)).await.unwrap();
        let mut second = new_image(author_id);
        second.main_image_path = "b.png".to_string();
        images.create(second).await.unwrap();

        let listed = images.list_with_authors().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].0.id < listed[1].0.id);
        assert_eq!(listed[0].1.name, "ayame");
    }
}
