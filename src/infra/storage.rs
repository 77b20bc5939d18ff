//! Object storage backends.

use std::sync::Arc;

use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, ObjectStore,
};

use crate::config::{StorageBackend, StorageConfig};
use crate::errors::{AppError, AppResult};

/// Build the configured object store.
///
/// The local backend creates its root directory when missing. The S3 backend
/// also reads the standard `AWS_*` credential variables.
pub fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    match &config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory object storage");
            Ok(Arc::new(InMemory::new()))
        }
        StorageBackend::Local(root) => {
            std::fs::create_dir_all(root).map_err(|e| {
                AppError::configuration(format!(
                    "Cannot create storage directory {}: {}",
                    root.display(),
                    e
                ))
            })?;
            let store = LocalFileSystem::new_with_prefix(root)?;
            tracing::info!(path = %root.display(), "Using local filesystem object storage");
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let mut builder = AmazonS3Builder::from_env()
                .with_bucket_name(&config.bucket)
                .with_region(&config.region);
            if let Some(endpoint) = &config.endpoint_url {
                builder = builder.with_endpoint(endpoint).with_allow_http(true);
            }
            let store = builder.build()?;
            tracing::info!(bucket = %config.bucket, region = %config.region, "Using S3 object storage");
            Ok(Arc::new(store))
        }
    }
}
