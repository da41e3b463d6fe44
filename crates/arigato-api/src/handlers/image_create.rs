use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use arigato_core::models::{NewImage, SubImage};
use arigato_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::form::{prepare_filename, resolve_author, ImageForm};
use crate::handlers::MessageResponse;
use crate::state::AppState;

/// Create an image record, implicitly creating its author when the request
/// carries a new author name instead of an id.
///
/// All validation happens before any file write or database mutation: a
/// rejected request leaves no partial state behind.
#[utoipa::path(
    post,
    path = "/images",
    tag = "images",
    responses(
        (status = 201, description = "Image added", body = MessageResponse),
        (status = 400, description = "Missing or malformed required field", body = ErrorResponse),
        (status = 404, description = "Unknown author id", body = ErrorResponse),
        (status = 409, description = "Duplicate author name", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "add_image"))]
pub async fn add_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut form = ImageForm::from_multipart(multipart, state.media.max_file_size).await?;

    // Required fields, checked before touching storage or the database
    if form.comments.is_none() {
        return Err(AppError::InvalidInput("comments field is required".to_string()).into());
    }
    let main_image = form.main_image.take().ok_or_else(|| {
        AppError::InvalidInput("main_image file is required".to_string())
    })?;
    let author_ref = form.author_ref()?.ok_or_else(|| {
        AppError::InvalidInput("author_id or new_author_name is required".to_string())
    })?;

    let main_name = prepare_filename(&main_image.filename, &state.media.allowed_extensions)?;
    let mut sub_names = Vec::with_capacity(form.sub_images.len());
    for sub in &form.sub_images {
        sub_names.push(prepare_filename(
            &sub.filename,
            &state.media.allowed_extensions,
        )?);
    }

    let author = resolve_author(&state.db, author_ref, form.new_author_sns_urls.clone()).await?;

    // File writes are sequential so sub-image order matches upload order
    let stored_main = state
        .media
        .store
        .store(&main_name, main_image.data)
        .await
        .map_err(HttpAppError::from)?;

    let sub_files = std::mem::take(&mut form.sub_images);
    let mut sub_images = Vec::with_capacity(sub_files.len());
    for (index, (sub, name)) in sub_files.into_iter().zip(sub_names).enumerate() {
        let stored = state
            .media
            .store
            .store(&name, sub.data)
            .await
            .map_err(HttpAppError::from)?;
        sub_images.push(SubImage {
            filename: stored,
            has_background: form.sub_image_flag(index),
        });
    }

    let record = state
        .db
        .image_repository
        .create(NewImage {
            author_id: author.id,
            main_image_path: stored_main,
            main_image_has_background: form.main_image_has_background.unwrap_or(false),
            sub_images,
            tags: form.normalized_tags(),
            comments: form.comments.clone(),
        })
        .await?;

    tracing::info!(image_id = record.id, author_id = author.id, "Image added");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Image added successfully")),
    ))
}
