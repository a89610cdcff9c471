//! In-memory operator construction using OpenDAL.
//!
//! Backs the migration engine's scenario tests and doubles as a dry-run
//! target. Contents live for the lifetime of the operator.

use opendal::services::Memory;
use opendal::Operator;

use super::error::StorageError;

/// Build an OpenDAL operator over process memory.
pub(crate) fn build_operator() -> Result<Operator, StorageError> {
    let builder = Memory::default();

    let op = Operator::new(builder)
        .map_err(|e| StorageError::Config(e.to_string()))?
        .finish();

    Ok(op)
}

#[cfg(test)]
mod tests {
    use crate::storage::{StoreConfig, StoreFactory, StoreParams};
    use bytes::Bytes;
    use futures::StreamExt;

    fn memory_store() -> crate::storage::BoxedObjectStore {
        StoreFactory::create(&StoreConfig::new("mem", StoreParams::Memory)).unwrap()
    }

    #[tokio::test]
    async fn listing_an_empty_store_yields_nothing() {
        let store = memory_store();
        let mut listing = store.list().await.unwrap();
        assert!(listing.next().await.is_none());
    }

    #[tokio::test]
    async fn write_then_list_then_delete() {
        let store = memory_store();

        let mut sink = store.writer("a").await.unwrap();
        sink.write(Bytes::from_static(b"payload")).await.unwrap();
        sink.close().await.unwrap();

        let mut listing = store.list().await.unwrap();
        let record = listing.next().await.unwrap().unwrap();
        assert_eq!(record.key, "a");

        store.delete("a").await.unwrap();
        let mut listing = store.list().await.unwrap();
        assert!(listing.next().await.is_none());
    }

    #[tokio::test]
    async fn reads_back_exactly_what_was_written() {
        let store = memory_store();

        let mut sink = store.writer("a").await.unwrap();
        sink.write(Bytes::from_static(b"payload")).await.unwrap();
        sink.close().await.unwrap();

        let mut reader = store.reader("a").await.unwrap();
        let mut data = Vec::new();
        while let Some(chunk) = reader.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(data, b"payload");
    }

    #[tokio::test]
    async fn check_succeeds_for_memory() {
        let store = memory_store();
        assert!(store.check().await.is_ok());
    }
}
