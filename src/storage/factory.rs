//! Store factory.
//!
//! Creates the appropriate store for a configuration's backend type. Every
//! backend ends up as an [`OpendalStore`] over a differently built operator.

use super::error::StorageError;
use super::store::OpendalStore;
use super::traits::BoxedObjectStore;
use super::types::{StorageType, StoreConfig};
use super::{gcs, local_fs, memory, s3};

/// Factory for creating store handles from configuration.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a new store handle for the configuration.
    ///
    /// Validates the configuration first; a handle coming out of here is
    /// well-formed but not yet confirmed reachable — that is the credential
    /// gate's job.
    pub fn create(config: &StoreConfig) -> Result<BoxedObjectStore, StorageError> {
        config.validate().map_err(StorageError::Config)?;

        let op = match config.storage_type() {
            StorageType::S3 => s3::build_operator(config)?,
            StorageType::Gcs => gcs::build_operator(config)?,
            StorageType::LocalFs => local_fs::build_operator(config)?,
            StorageType::Memory => memory::build_operator()?,
        };

        Ok(OpendalStore::boxed(
            config.name.clone(),
            config.storage_type(),
            op,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::StoreParams;
    use std::path::PathBuf;

    #[test]
    fn rejects_invalid_config() {
        let config = StoreConfig::new(
            "aws",
            StoreParams::S3 {
                bucket: String::new(),
                region: "us-east-1".to_string(),
                endpoint: None,
                access_key_id: None,
                allow_anonymous: false,
            },
        );
        assert!(matches!(
            StoreFactory::create(&config),
            Err(StorageError::Config(_))
        ));
    }

    #[test]
    fn creates_s3_store() {
        let config = StoreConfig::new(
            "aws",
            StoreParams::S3 {
                bucket: "my-bucket".to_string(),
                region: "us-east-1".to_string(),
                endpoint: None,
                access_key_id: None,
                allow_anonymous: false,
            },
        );
        let store = StoreFactory::create(&config).unwrap();
        assert_eq!(store.storage_type(), StorageType::S3);
        assert_eq!(store.name(), "aws");
    }

    #[test]
    fn creates_local_fs_store() {
        let config = StoreConfig::new(
            "disk",
            StoreParams::LocalFs {
                root_path: PathBuf::from("/tmp/brigade-test"),
            },
        );
        let store = StoreFactory::create(&config).unwrap();
        assert_eq!(store.storage_type(), StorageType::LocalFs);
    }
}
