//! Repository implementations.

pub mod authors;
pub mod images;

pub use authors::AuthorRepository;
pub use images::ImageRepository;
