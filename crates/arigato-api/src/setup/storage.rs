//! Asset storage setup

use std::sync::Arc;

use anyhow::Result;
use arigato_core::Config;
use arigato_storage::{AssetStore, LocalAssetStore};

/// Create the local asset store rooted at the configured upload directory.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn AssetStore>> {
    let store = LocalAssetStore::new(
        config.upload_dir.clone(),
        config.public_image_prefix.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    tracing::info!(upload_dir = %config.upload_dir, "Asset storage ready");

    Ok(Arc::new(store))
}
