//! Author domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::types::Json;
#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// An author who has uploaded one or more image records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub sns_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an author (implicitly, as part of an image create
/// request carrying a new author name).
#[derive(Debug, Clone, Validate)]
pub struct NewAuthor {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub sns_urls: Vec<String>,
}

/// Database row for an author. `sns_urls` is a JSON array stored as TEXT.
#[cfg(feature = "sqlx")]
#[derive(Debug, FromRow)]
pub struct AuthorRow {
    pub id: i64,
    pub name: String,
    pub sns_urls: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl AuthorRow {
    pub fn into_author(self) -> Author {
        Author {
            id: self.id,
            name: self.name,
            sns_urls: self.sns_urls.0,
            created_at: self.created_at,
        }
    }
}

/// Public author view: `{id, author_name, sns_urls}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorResponse {
    pub id: i64,
    pub author_name: String,
    pub sns_urls: Vec<String>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        AuthorResponse {
            id: author.id,
            author_name: author.name,
            sns_urls: author.sns_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn new_author_name_length_is_validated() {
        let ok = NewAuthor {
            name: "ayame".to_string(),
            sns_urls: vec![],
        };
        assert!(ok.validate().is_ok());

        let empty = NewAuthor {
            name: String::new(),
            sns_urls: vec![],
        };
        assert!(empty.validate().is_err());

        let too_long = NewAuthor {
            name: "x".repeat(101),
            sns_urls: vec![],
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn response_renames_name_to_author_name() {
        let author = Author {
            id: 7,
            name: "ayame".to_string(),
            sns_urls: vec!["https://example.com/ayame".to_string()],
            created_at: Utc::now(),
        };
        let view = AuthorResponse::from(author);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["author_name"], "ayame");
        assert_eq!(json["id"], 7);
        assert!(json.get("name").is_none());
        assert!(json.get("created_at").is_none());
    }
}
