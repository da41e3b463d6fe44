//! Domain models and public view types.

pub mod author;
pub mod image;

pub use author::{Author, AuthorResponse, NewAuthor};
pub use image::{ImageRecord, ImageResponse, NewImage, SubImage, SubImageView, UpdateImage};

#[cfg(feature = "sqlx")]
pub use author::AuthorRow;
#[cfg(feature = "sqlx")]
pub use image::ImageRow;
