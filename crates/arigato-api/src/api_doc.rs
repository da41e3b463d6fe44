//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use arigato_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Arigato API",
        version = "0.1.0",
        description = "Thanks-image gallery backend: authors upload a main image plus optional sub-images, tag and annotate them, and clients browse and edit the records."
    ),
    paths(
        handlers::image_create::add_image,
        handlers::image_get::get_image,
        handlers::image_get::list_images,
        handlers::image_update::update_image,
        handlers::image_delete::delete_image,
        handlers::authors::list_authors,
    ),
    components(schemas(
        models::ImageResponse,
        models::SubImageView,
        models::AuthorResponse,
        handlers::MessageResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "images", description = "Image record operations"),
        (name = "authors", description = "Author listing")
    )
)]
pub struct ApiDoc;
