//! Storage setup and initialization

use anyhow::Result;
use memeshelf_core::Config;
use memeshelf_services::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage backend...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage backend initialized"
    );
    Ok(storage)
}
