//! Google Cloud Storage operator construction using OpenDAL.
//!
//! GCS auth goes through a service account credentials file. When the
//! configuration names no file, the application-default-credentials location
//! applies: the `GOOGLE_APPLICATION_CREDENTIALS` environment variable, else
//! `~/.config/gcloud/application_default_credentials.json`.

use opendal::layers::LoggingLayer;
use opendal::services::Gcs;
use opendal::Operator;
use std::path::{Path, PathBuf};

use super::error::StorageError;
use super::types::{StoreConfig, StoreParams};

/// Application-default-credentials path relative to the home directory.
const DEFAULT_ADC_PATH: &str = ".config/gcloud/application_default_credentials.json";

/// Resolve the credentials file this configuration will authenticate with.
///
/// An explicitly configured path wins over the environment variable, which
/// wins over the home-directory default. Only the default requires a home
/// directory to exist.
pub fn credentials_path(config: &StoreConfig) -> Result<PathBuf, StorageError> {
    let explicit = match &config.params {
        StoreParams::Gcs {
            credentials_path, ..
        } => credentials_path.as_deref(),
        _ => {
            return Err(StorageError::Config(format!(
                "provider \"{}\" does not carry GCS parameters",
                config.name
            )))
        }
    };

    resolve_credentials_path(
        explicit,
        std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
        dirs::home_dir(),
    )
}

fn resolve_credentials_path(
    explicit: Option<&Path>,
    env_override: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, StorageError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_override {
        return Ok(path);
    }
    home.map(|h| h.join(DEFAULT_ADC_PATH)).ok_or_else(|| {
        StorageError::Config(
            "cannot locate application default credentials: no home directory".to_string(),
        )
    })
}

/// Build an OpenDAL operator for a GCS bucket.
pub(crate) fn build_operator(config: &StoreConfig) -> Result<Operator, StorageError> {
    let bucket = match &config.params {
        StoreParams::Gcs { bucket, .. } => bucket.as_str(),
        _ => {
            return Err(StorageError::Config(format!(
                "provider \"{}\" does not carry GCS parameters",
                config.name
            )))
        }
    };

    let mut builder = Gcs::default().bucket(bucket);

    let creds = credentials_path(config)?;
    let creds = creds
        .to_str()
        .ok_or_else(|| StorageError::Config("credentials path is not valid UTF-8".to_string()))?;
    builder = builder.credential_path(creds);

    let op = Operator::new(builder)
        .map_err(|e| StorageError::Config(e.to_string()))?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}
