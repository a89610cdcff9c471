//! S3 operator construction using OpenDAL.
//!
//! Covers Amazon S3 and S3-compatible services (MinIO, Cloudflare R2,
//! DigitalOcean Spaces). The secret access key is never part of the
//! configuration; OpenDAL picks it up from the environment.

use opendal::layers::LoggingLayer;
use opendal::services::S3;
use opendal::Operator;

use super::error::StorageError;
use super::types::{StoreConfig, StoreParams};

/// Build an OpenDAL operator for an S3 bucket.
pub(crate) fn build_operator(config: &StoreConfig) -> Result<Operator, StorageError> {
    let (bucket, region, endpoint, access_key_id, allow_anonymous) = match &config.params {
        StoreParams::S3 {
            bucket,
            region,
            endpoint,
            access_key_id,
            allow_anonymous,
        } => (
            bucket.as_str(),
            region.as_str(),
            endpoint.as_deref(),
            access_key_id.as_deref(),
            *allow_anonymous,
        ),
        _ => {
            return Err(StorageError::Config(format!(
                "provider \"{}\" does not carry S3 parameters",
                config.name
            )))
        }
    };

    let mut builder = S3::default().bucket(bucket).region(region);

    // Custom endpoint for S3-compatible services
    if let Some(ep) = endpoint {
        if !ep.is_empty() {
            builder = builder.endpoint(ep);
        }
    }

    if allow_anonymous {
        builder = builder.allow_anonymous();
    } else if let Some(key_id) = access_key_id {
        builder = builder.access_key_id(key_id);
    }

    let op = Operator::new(builder)
        .map_err(|e| StorageError::Config(e.to_string()))?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}
