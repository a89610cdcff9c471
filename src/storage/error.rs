//! Storage error taxonomy.
//!
//! Each variant names the operation that failed and carries the store label
//! (and key, where one applies) so a migration failure can say exactly which
//! object on which side went wrong.

use thiserror::Error;

/// Boxed source error; storage failures originate from OpenDAL or raw I/O
/// depending on where in a stream they occur.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by [`ObjectStore`](super::ObjectStore) operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key does not exist (raced deletion is possible and tolerated by
    /// callers only after a successful copy).
    #[error("object \"{key}\" not found in {store}")]
    NotFound { store: String, key: String },

    /// Enumeration failed, possibly mid-stream.
    #[error("failed to list objects in {store}")]
    List {
        store: String,
        #[source]
        source: BoxedSource,
    },

    /// Opening or draining a read stream failed.
    #[error("failed to read \"{key}\" from {store}")]
    Read {
        store: String,
        key: String,
        #[source]
        source: BoxedSource,
    },

    /// Opening, feeding, or closing a write sink failed. Writes are not
    /// durable until the sink closes cleanly.
    #[error("failed to write \"{key}\" to {store}")]
    Write {
        store: String,
        key: String,
        #[source]
        source: BoxedSource,
    },

    /// Removing an object failed.
    #[error("failed to delete \"{key}\" from {store}")]
    Delete {
        store: String,
        key: String,
        #[source]
        source: BoxedSource,
    },

    /// The bucket cannot be reached with current credentials.
    #[error("bucket for {store} is not reachable")]
    Unreachable {
        store: String,
        #[source]
        source: BoxedSource,
    },

    /// The configuration cannot describe a usable store.
    #[error("invalid storage configuration: {0}")]
    Config(String),
}

impl StorageError {
    /// True when the error is a missing-object error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub(crate) fn list(store: &str, source: impl Into<BoxedSource>) -> Self {
        StorageError::List {
            store: store.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn read(store: &str, key: &str, source: impl Into<BoxedSource>) -> Self {
        StorageError::Read {
            store: store.to_string(),
            key: key.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn write(store: &str, key: &str, source: impl Into<BoxedSource>) -> Self {
        StorageError::Write {
            store: store.to_string(),
            key: key.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn unreachable(store: &str, source: impl Into<BoxedSource>) -> Self {
        StorageError::Unreachable {
            store: store.to_string(),
            source: source.into(),
        }
    }

    /// Map an OpenDAL error for a keyed operation, surfacing missing objects
    /// as [`StorageError::NotFound`].
    pub(crate) fn from_opendal(
        store: &str,
        key: &str,
        err: opendal::Error,
        make: fn(&str, &str, BoxedSource) -> Self,
    ) -> Self {
        if err.kind() == opendal::ErrorKind::NotFound {
            StorageError::NotFound {
                store: store.to_string(),
                key: key.to_string(),
            }
        } else {
            make(store, key, Box::new(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_classified() {
        let err = StorageError::NotFound {
            store: "aws".to_string(),
            key: "a".to_string(),
        };
        assert!(err.is_not_found());

        let err = StorageError::list("aws", std::io::Error::other("boom"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn opendal_not_found_maps_to_not_found() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "missing");
        let mapped = StorageError::from_opendal("aws", "a", err, |s, k, e| {
            StorageError::Read {
                store: s.to_string(),
                key: k.to_string(),
                source: e,
            }
        });
        assert!(mapped.is_not_found());
    }

    #[test]
    fn error_messages_name_store_and_key() {
        let err = StorageError::write("gcp", "photos/cat.jpg", std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "failed to write \"photos/cat.jpg\" to gcp");
    }
}
