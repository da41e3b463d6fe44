//! Database repositories for the data access layer.
//!
//! Each repository owns one domain entity and provides CRUD operations over
//! the shared SQLite pool. Repositories return clean domain models; rows and
//! JSON-column plumbing stay internal.

pub mod db;

pub use db::{AuthorRepository, ImageRepository};
