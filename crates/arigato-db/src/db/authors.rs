use arigato_core::models::{Author, AuthorRow, NewAuthor};
use arigato_core::AppError;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool};
use validator::Validate;

/// Author repository
///
/// Owns `Author` records. Name uniqueness is checked explicitly before
/// insert so a duplicate surfaces as a conflict rather than a raw database
/// constraint failure.
#[derive(Clone)]
pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "authors", db.operation = "insert"))]
    pub async fn create(&self, new_author: NewAuthor) -> Result<Author, AppError> {
        new_author.validate()?;

        if self.find_by_name(&new_author.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Author '{}' already exists",
                new_author.name
            )));
        }

        let now = Utc::now();
        let row: AuthorRow = sqlx::query_as::<Sqlite, AuthorRow>(
            r#"
            INSERT INTO authors (name, sns_urls, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new_author.name)
        .bind(Json(&new_author.sns_urls))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_author())
    }

    #[tracing::instrument(skip(self), fields(db.table = "authors", db.operation = "select"))]
    pub async fn find_by_id(&self, id: i64) -> Result<Author, AppError> {
        let row: Option<AuthorRow> =
            sqlx::query_as::<Sqlite, AuthorRow>("SELECT * FROM authors WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(AuthorRow::into_author)
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Author>, AppError> {
        let row: Option<AuthorRow> =
            sqlx::query_as::<Sqlite, AuthorRow>("SELECT * FROM authors WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(AuthorRow::into_author))
    }

    /// All authors, ordered by id ascending for a stable listing.
    #[tracing::instrument(skip(self), fields(db.table = "authors", db.operation = "select"))]
    pub async fn find_all(&self) -> Result<Vec<Author>, AppError> {
        let rows: Vec<AuthorRow> =
            sqlx::query_as::<Sqlite, AuthorRow>("SELECT * FROM authors ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(AuthorRow::into_author).collect())
    }
}
