use axum::{extract::State, response::IntoResponse, Json};
use arigato_core::models::AuthorResponse;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::DbState;

#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "List of authors", body = Vec<AuthorResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db), fields(operation = "list_authors"))]
pub async fn list_authors(State(db): State<DbState>) -> Result<impl IntoResponse, HttpAppError> {
    let authors = db.author_repository.find_all().await?;

    let responses: Vec<AuthorResponse> = authors.into_iter().map(AuthorResponse::from).collect();

    Ok(Json(responses))
}
