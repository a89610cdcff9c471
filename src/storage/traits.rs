//! Storage capability traits.
//!
//! [`ObjectStore`] is the capability set the migration engine needs from a
//! provider: enumerate keys, stream object bytes in and out, delete, and
//! confirm reachability. Provider-specific addressing and auth stay behind
//! the trait.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use super::error::StorageError;
use super::types::{ObjectRecord, StorageType};

/// Lazy listing of a store. Enumeration errors surface as stream items
/// rather than truncating silently; restarting means calling `list()` again.
pub type ObjectListing = BoxStream<'static, Result<ObjectRecord, StorageError>>;

/// Byte stream for one object's contents.
pub type ObjectReader = BoxStream<'static, Result<Bytes, StorageError>>;

/// Core capability interface implemented once per provider.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// The backend type behind this handle.
    fn storage_type(&self) -> StorageType;

    /// Label used in logs and errors (e.g. "aws", "gcp").
    fn name(&self) -> &str;

    /// Confirm the bucket is reachable with current credentials.
    async fn check(&self) -> Result<(), StorageError>;

    /// Enumerate every object in the bucket.
    ///
    /// Order is whatever the backend yields; no sort is assumed.
    async fn list(&self) -> Result<ObjectListing, StorageError>;

    /// Open a read stream for one object.
    ///
    /// Fails with [`StorageError::NotFound`] if the key no longer exists;
    /// a race with concurrent deletion is possible and must be tolerated.
    async fn reader(&self, key: &str) -> Result<ObjectReader, StorageError>;

    /// Open a write sink for one object.
    ///
    /// The write is not durable until the sink is closed.
    async fn writer(&self, key: &str) -> Result<Box<dyn ObjectSink>, StorageError>;

    /// Delete one object.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Byte sink for one object being written.
#[async_trait]
pub trait ObjectSink: Send {
    /// Append a chunk to the object.
    async fn write(&mut self, chunk: Bytes) -> Result<(), StorageError>;

    /// Flush and commit the object. Consumes the sink; without this call
    /// the written bytes must not be considered durable.
    async fn close(self: Box<Self>) -> Result<(), StorageError>;
}

/// A boxed store handle for dynamic dispatch.
pub type BoxedObjectStore = Box<dyn ObjectStore>;
