use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use arigato_core::models::{SubImage, UpdateImage};
use arigato_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::form::{prepare_filename, resolve_author, ImageForm};
use crate::handlers::MessageResponse;
use crate::state::AppState;

/// Partial update: only fields present in the request overwrite stored
/// values. Tags are fully replaced when present; the sub-image list is
/// fully replaced when the request includes new sub-image files; a new main
/// image replaces the stored path in place. Old blobs are not deleted.
///
/// A storage failure while writing a replacement file aborts the whole
/// update before the record is touched.
#[utoipa::path(
    put,
    path = "/images/{id}",
    tag = "images",
    params(
        ("id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image updated", body = MessageResponse),
        (status = 400, description = "Malformed field", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(image_id = %id, operation = "update_image"))]
pub async fn update_image(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut form = ImageForm::from_multipart(multipart, state.media.max_file_size).await?;

    // 404 before any file write so a bad id cannot orphan blobs
    state
        .db
        .image_repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let author_id = match form.author_ref()? {
        Some(author_ref) => Some(
            resolve_author(&state.db, author_ref, form.new_author_sns_urls.clone())
                .await?
                .id,
        ),
        None => None,
    };

    // Sanitize every incoming filename before writing anything
    let main_file = form.main_image.take();
    let main_name = main_file
        .as_ref()
        .map(|file| prepare_filename(&file.filename, &state.media.allowed_extensions))
        .transpose()?;
    let sub_files = std::mem::take(&mut form.sub_images);
    let mut sub_names = Vec::with_capacity(sub_files.len());
    for sub in &sub_files {
        sub_names.push(prepare_filename(
            &sub.filename,
            &state.media.allowed_extensions,
        )?);
    }

    let main_image_path = match (main_file, main_name) {
        (Some(file), Some(name)) => Some(
            state
                .media
                .store
                .store(&name, file.data)
                .await
                .map_err(HttpAppError::from)?,
        ),
        _ => None,
    };

    let sub_images = if sub_files.is_empty() {
        None
    } else {
        let mut stored = Vec::with_capacity(sub_names.len());
        for (index, (sub, name)) in sub_files.into_iter().zip(sub_names).enumerate() {
            let filename = state
                .media
                .store
                .store(&name, sub.data)
                .await
                .map_err(HttpAppError::from)?;
            stored.push(SubImage {
                filename,
                has_background: form.sub_image_flag(index),
            });
        }
        Some(stored)
    };

    let tags = form.tags_provided().then(|| form.normalized_tags());

    state
        .db
        .image_repository
        .update(
            id,
            UpdateImage {
                author_id,
                main_image_path,
                main_image_has_background: form.main_image_has_background,
                sub_images,
                tags,
                comments: form.comments.clone(),
            },
        )
        .await?;

    tracing::info!(image_id = id, "Image updated");

    Ok(Json(MessageResponse::new("Image updated successfully")))
}
