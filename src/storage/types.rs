//! Storage types and configuration.
//!
//! This module defines the types shared by all storage backends: the backend
//! kind, per-backend connection parameters, and the record produced when a
//! bucket is enumerated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supported storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Amazon S3 and S3-compatible services (MinIO, R2, DigitalOcean Spaces)
    S3,
    /// Google Cloud Storage
    Gcs,
    /// Local filesystem
    LocalFs,
    /// In-memory store for tests and dry runs
    Memory,
}

impl StorageType {
    /// Get the display name for this storage type.
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageType::S3 => "Amazon S3",
            StorageType::Gcs => "Google Cloud Storage",
            StorageType::LocalFs => "Local Filesystem",
            StorageType::Memory => "In-Memory",
        }
    }

    /// Check if this storage type requires credentials to be present
    /// before the bucket can be reached.
    pub fn requires_credentials(&self) -> bool {
        match self {
            StorageType::S3 | StorageType::Gcs => true,
            StorageType::LocalFs | StorageType::Memory => false,
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for one provider's bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Label used in logs and error messages (e.g. "aws", "gcp").
    pub name: String,
    /// Storage-specific parameters.
    #[serde(flatten)]
    pub params: StoreParams,
}

impl StoreConfig {
    /// Create a new store configuration.
    pub fn new(name: impl Into<String>, params: StoreParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// The backend type implied by the parameters.
    pub fn storage_type(&self) -> StorageType {
        self.params.storage_type()
    }

    /// Validate the configuration before any connection is attempted.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("provider name is required".to_string());
        }
        match &self.params {
            StoreParams::S3 { bucket, region, .. } => {
                if bucket.is_empty() {
                    return Err("S3 bucket name is required".to_string());
                }
                if region.is_empty() {
                    return Err("S3 region is required".to_string());
                }
                Ok(())
            }
            StoreParams::Gcs { bucket, .. } => {
                if bucket.is_empty() {
                    return Err("GCS bucket name is required".to_string());
                }
                Ok(())
            }
            StoreParams::LocalFs { root_path } => {
                if root_path.as_os_str().is_empty() {
                    return Err("local filesystem root path is required".to_string());
                }
                Ok(())
            }
            StoreParams::Memory => Ok(()),
        }
    }
}

/// Storage-specific connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreParams {
    /// S3 and S3-compatible storage parameters.
    S3 {
        /// Bucket name
        bucket: String,
        /// AWS region (e.g. "us-east-1")
        region: String,
        /// S3 endpoint URL (leave unset for AWS, set for MinIO/R2/etc.)
        #[serde(default)]
        endpoint: Option<String>,
        /// Access key ID; the secret comes from the environment
        #[serde(default)]
        access_key_id: Option<String>,
        /// Allow unsigned requests for public buckets
        #[serde(default)]
        allow_anonymous: bool,
    },
    /// Google Cloud Storage parameters.
    Gcs {
        /// GCS bucket name
        bucket: String,
        /// Service account credentials JSON path; when unset, the
        /// application-default-credentials file is used
        #[serde(default)]
        credentials_path: Option<PathBuf>,
    },
    /// Local filesystem parameters.
    #[serde(rename = "local")]
    LocalFs {
        /// Root directory standing in for the bucket
        root_path: PathBuf,
    },
    /// In-memory parameters (no configuration).
    Memory,
}

impl StoreParams {
    /// The backend type these parameters belong to.
    pub fn storage_type(&self) -> StorageType {
        match self {
            StoreParams::S3 { .. } => StorageType::S3,
            StoreParams::Gcs { .. } => StorageType::Gcs,
            StoreParams::LocalFs { .. } => StorageType::LocalFs,
            StoreParams::Memory => StorageType::Memory,
        }
    }

    /// Get the bucket name if this backend has one.
    pub fn bucket_name(&self) -> Option<&str> {
        match self {
            StoreParams::S3 { bucket, .. } => Some(bucket),
            StoreParams::Gcs { bucket, .. } => Some(bucket),
            StoreParams::LocalFs { .. } | StoreParams::Memory => None,
        }
    }
}

/// One object produced by enumerating a store.
///
/// Keys are opaque strings scoped to a single bucket; the store that produced
/// the record is implied by the handle `list()` was called on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Object key relative to the bucket root.
    pub key: String,
    /// Size in bytes, when the backend reports it.
    pub size: Option<u64>,
    /// Last modified timestamp, when the backend reports it.
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectRecord {
    /// Create a record for a bare key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
            last_modified: None,
        }
    }
}
