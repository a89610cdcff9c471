//! Local filesystem operator construction using OpenDAL.
//!
//! A directory stands in for a bucket. Useful for development and for
//! exercising the migration engine against real I/O without cloud access.

use opendal::layers::LoggingLayer;
use opendal::services::Fs;
use opendal::Operator;

use super::error::StorageError;
use super::types::{StoreConfig, StoreParams};

/// Build an OpenDAL operator rooted at the configured directory.
pub(crate) fn build_operator(config: &StoreConfig) -> Result<Operator, StorageError> {
    let root_path = match &config.params {
        StoreParams::LocalFs { root_path } => root_path,
        _ => {
            return Err(StorageError::Config(format!(
                "provider \"{}\" does not carry local filesystem parameters",
                config.name
            )))
        }
    };

    let root = root_path
        .to_str()
        .ok_or_else(|| StorageError::Config("root path is not valid UTF-8".to_string()))?;
    let builder = Fs::default().root(root);

    let op = Operator::new(builder)
        .map_err(|e| StorageError::Config(e.to_string()))?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreFactory;
    use bytes::Bytes;
    use futures::StreamExt;
    use std::path::PathBuf;

    fn fs_config(root: PathBuf) -> StoreConfig {
        StoreConfig::new("disk", StoreParams::LocalFs { root_path: root })
    }

    #[test]
    fn rejects_mismatched_params() {
        let config = StoreConfig::new("disk", StoreParams::Memory);
        assert!(matches!(
            build_operator(&config),
            Err(StorageError::Config(_))
        ));
    }

    #[tokio::test]
    async fn round_trips_an_object_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreFactory::create(&fs_config(dir.path().to_path_buf())).unwrap();

        let mut sink = store.writer("nested/hello.txt").await.unwrap();
        sink.write(Bytes::from_static(b"hello ")).await.unwrap();
        sink.write(Bytes::from_static(b"world")).await.unwrap();
        sink.close().await.unwrap();

        let mut reader = store.reader("nested/hello.txt").await.unwrap();
        let mut data = Vec::new();
        while let Some(chunk) = reader.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(data, b"hello world");

        let mut listing = store.list().await.unwrap();
        let mut keys = Vec::new();
        while let Some(record) = listing.next().await {
            keys.push(record.unwrap().key);
        }
        assert_eq!(keys, vec!["nested/hello.txt".to_string()]);

        store.delete("nested/hello.txt").await.unwrap();
        assert!(!dir.path().join("nested/hello.txt").exists());
    }

    #[tokio::test]
    async fn reading_a_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreFactory::create(&fs_config(dir.path().to_path_buf())).unwrap();

        let err = store.reader("absent.txt").await.map(|_| ()).unwrap_err();
        assert!(err.is_not_found());
    }
}
