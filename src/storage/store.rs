//! OpenDAL-backed object store.
//!
//! Every provider converges on an [`opendal::Operator`]; the per-provider
//! modules only differ in how the operator is built. This file holds the one
//! [`ObjectStore`] implementation that drives an operator.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use opendal::{EntryMode, Operator};

use super::error::StorageError;
use super::traits::{ObjectListing, ObjectReader, ObjectSink, ObjectStore};
use super::types::{ObjectRecord, StorageType};

/// Object store driven by an OpenDAL operator.
pub struct OpendalStore {
    label: String,
    storage_type: StorageType,
    op: Operator,
}

impl OpendalStore {
    /// Wrap an operator under a provider label.
    pub fn new(label: impl Into<String>, storage_type: StorageType, op: Operator) -> Self {
        Self {
            label: label.into(),
            storage_type,
            op,
        }
    }

    /// Wrap an operator into a boxed trait object.
    pub fn boxed(
        label: impl Into<String>,
        storage_type: StorageType,
        op: Operator,
    ) -> Box<dyn ObjectStore> {
        Box::new(Self::new(label, storage_type, op))
    }

    /// Normalize a key for OpenDAL (no leading slash).
    fn normalize_key(key: &str) -> &str {
        key.trim_start_matches('/')
    }

    /// Convert an OpenDAL entry to an ObjectRecord.
    fn entry_to_record(path: String, metadata: &opendal::Metadata) -> ObjectRecord {
        ObjectRecord {
            key: path,
            size: Some(metadata.content_length()),
            last_modified: metadata.last_modified(),
        }
    }
}

#[async_trait]
impl ObjectStore for OpendalStore {
    fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    fn name(&self) -> &str {
        &self.label
    }

    async fn check(&self) -> Result<(), StorageError> {
        self.op
            .check()
            .await
            .map_err(|e| StorageError::unreachable(&self.label, e))
    }

    async fn list(&self) -> Result<ObjectListing, StorageError> {
        let lister = self
            .op
            .lister_with("")
            .recursive(true)
            .await
            .map_err(|e| StorageError::list(&self.label, e))?;

        let store = self.label.clone();
        let stream = lister.filter_map(move |entry| {
            let store = store.clone();
            async move {
                match entry {
                    Ok(entry) => {
                        // Directory markers are addressing artifacts, not objects.
                        if entry.metadata().mode() == EntryMode::DIR {
                            return None;
                        }
                        let path = entry.path().to_string();
                        Some(Ok(Self::entry_to_record(path, entry.metadata())))
                    }
                    Err(e) => Some(Err(StorageError::list(&store, e))),
                }
            }
        });

        Ok(Box::pin(stream))
    }

    async fn reader(&self, key: &str) -> Result<ObjectReader, StorageError> {
        let key = Self::normalize_key(key).to_string();

        // Surface a missing key at open time rather than mid-stream; some
        // backends only open lazily.
        self.op.stat(&key).await.map_err(|e| {
            StorageError::from_opendal(&self.label, &key, e, |s, k, e| StorageError::Read {
                store: s.to_string(),
                key: k.to_string(),
                source: e,
            })
        })?;

        let reader = self.op.reader(&key).await.map_err(|e| {
            StorageError::from_opendal(&self.label, &key, e, |s, k, e| StorageError::Read {
                store: s.to_string(),
                key: k.to_string(),
                source: e,
            })
        })?;

        let stream = reader
            .into_bytes_stream(..)
            .await
            .map_err(|e| StorageError::read(&self.label, &key, e))?;

        let store = self.label.clone();
        let stream =
            stream.map(move |result| result.map_err(|e| StorageError::read(&store, &key, e)));

        Ok(Box::pin(stream))
    }

    async fn writer(&self, key: &str) -> Result<Box<dyn ObjectSink>, StorageError> {
        let key = Self::normalize_key(key).to_string();

        let writer = self
            .op
            .writer(&key)
            .await
            .map_err(|e| StorageError::write(&self.label, &key, e))?;

        Ok(Box::new(OpendalSink {
            store: self.label.clone(),
            key,
            writer,
        }))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = Self::normalize_key(key);

        self.op.delete(key).await.map_err(|e| {
            StorageError::from_opendal(&self.label, key, e, |s, k, e| StorageError::Delete {
                store: s.to_string(),
                key: k.to_string(),
                source: e,
            })
        })
    }
}

/// Write sink backed by an OpenDAL writer.
struct OpendalSink {
    store: String,
    key: String,
    writer: opendal::Writer,
}

#[async_trait]
impl ObjectSink for OpendalSink {
    async fn write(&mut self, chunk: Bytes) -> Result<(), StorageError> {
        self.writer
            .write(chunk)
            .await
            .map_err(|e| StorageError::write(&self.store, &self.key, e))
    }

    async fn close(mut self: Box<Self>) -> Result<(), StorageError> {
        self.writer
            .close()
            .await
            .map_err(|e| StorageError::write(&self.store, &self.key, e))?;
        Ok(())
    }
}
