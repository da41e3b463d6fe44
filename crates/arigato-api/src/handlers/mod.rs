//! HTTP handlers.

pub mod authors;
pub mod image_create;
pub mod image_delete;
pub mod image_get;
pub mod image_update;
pub mod login;

use serde::Serialize;
use utoipa::ToSchema;

/// Simple `{message}` acknowledgment body for mutating endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}
