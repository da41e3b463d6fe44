//! Arigato asset storage.
//!
//! Uploaded image bytes are persisted under a configured content root and
//! referenced everywhere else by their sanitized filename only. Public paths
//! are a deterministic projection computed at read time, never stored.

mod local;
mod traits;

pub use local::LocalAssetStore;
pub use traits::{AssetStore, StorageError, StorageResult};
