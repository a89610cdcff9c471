//! Object storage backends.
//!
//! A unified capability interface over heterogeneous bucket providers,
//! built on Apache OpenDAL.
//!
//! Supported backends:
//!
//! - **Amazon S3** and S3-compatible services (MinIO, Cloudflare R2,
//!   DigitalOcean Spaces)
//! - **Google Cloud Storage (GCS)**
//! - **Local Filesystem** for development and testing
//! - **In-Memory** for tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   StoreFactory                      │
//! │  - Validates config, picks the backend builder      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                   OpendalStore                      │
//! │  - One ObjectStore impl over an opendal::Operator   │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!          ┌───────────────┼───────────────┬──────────┐
//!          ▼               ▼               ▼          ▼
//!       s3::build      gcs::build    local_fs::   memory::
//!       _operator      _operator     build_op..   build_op..
//! ```

mod error;
mod factory;
pub mod gcs;
mod local_fs;
mod memory;
mod s3;
mod store;
mod traits;
mod types;

pub use error::StorageError;
pub use factory::StoreFactory;
pub use store::OpendalStore;
pub use traits::{BoxedObjectStore, ObjectListing, ObjectReader, ObjectSink, ObjectStore};
pub use types::{ObjectRecord, StorageType, StoreConfig, StoreParams};
