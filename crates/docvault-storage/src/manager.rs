//! Object store selection from configuration.

use std::sync::Arc;

use tracing::info;

use docvault_core::config::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::ObjectStore;

use crate::providers::LocalObjectStore;

/// Build the provider named by `storage.provider`.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.provider.as_str() {
        "local" => Arc::new(
            LocalObjectStore::new(&config.local.root_path, &config.public_base_url).await?,
        ),
        #[cfg(feature = "s3")]
        "s3" => Arc::new(
            crate::providers::S3ObjectStore::new(&config.s3, &config.public_base_url).await?,
        ),
        other => {
            return Err(AppError::configuration(format!(
                "Unsupported storage provider '{other}'"
            )));
        }
    };
    info!(provider = store.provider_type(), "Object store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = StorageConfig {
            provider: "ftp".to_string(),
            ..Default::default()
        };
        let err = build_object_store(&config).await.unwrap_err();
        assert_eq!(err.kind, docvault_core::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_local_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorageConfig::default();
        config.local.root_path = dir.path().to_string_lossy().into_owned();
        let store = build_object_store(&config).await.unwrap();
        assert_eq!(store.provider_type(), "local");
    }
}
