//! Migration engine.
//!
//! One run enumerates both stores, picks the fuller one as the source, and
//! moves every key over with a copy-then-delete sequence. A key is only
//! retired from the source once its copy has been flushed and closed on the
//! destination, so any failure leaves objects duplicated rather than lost.
//! Failure semantics are run-level: the first error aborts the run, keys
//! already fully moved stay moved (at-least-once, not transactional).

use futures::StreamExt;
use std::fmt;
use tracing::{info, warn};

use crate::storage::{ObjectStore, StorageError};

/// Which way a run moved objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Store A was the source, store B the destination.
    AToB,
    /// Store B was the source, store A the destination.
    BToA,
}

/// Phase of the run an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    /// Enumerating one of the stores.
    List,
    /// Opening or draining the source read stream.
    Read,
    /// Opening, feeding, or closing the destination sink.
    Write,
    /// Retiring the key from the source.
    Delete,
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            MigrationPhase::List => "listing",
            MigrationPhase::Read => "reading",
            MigrationPhase::Write => "writing",
            MigrationPhase::Delete => "deleting",
        };
        f.write_str(phase)
    }
}

/// A failed run: the phase, the key in progress (none for listing), and how
/// many objects had already been fully migrated before the failure.
#[derive(Debug)]
pub struct MigrationError {
    pub phase: MigrationPhase,
    pub key: Option<String>,
    pub migrated: usize,
    pub source: StorageError,
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(
                f,
                "migration failed while {} \"{}\" ({} objects already migrated)",
                self.phase, key, self.migrated
            ),
            None => write!(
                f,
                "migration failed while {} ({} objects already migrated)",
                self.phase, self.migrated
            ),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Chosen transfer direction.
    pub direction: Direction,
    /// Label of the store that was drained.
    pub source: String,
    /// Label of the store that received the objects.
    pub destination: String,
    /// Number of objects fully migrated (copied and retired).
    pub migrated: usize,
}

impl fmt::Display for MigrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "migrated {} objects from {} to {}",
            self.migrated, self.source, self.destination
        )
    }
}

/// Moves every object from the fuller of two stores into the other.
#[derive(Debug, Default)]
pub struct MigrationEngine;

impl MigrationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run one migration between two ready stores.
    ///
    /// The store with strictly more objects becomes the source; on a tie,
    /// store A does, so the choice is deterministic for a run. Keys are
    /// processed in listing order, one at a time; the first failure aborts
    /// the run and is returned with its phase and progress count.
    pub async fn migrate(
        &self,
        store_a: &dyn ObjectStore,
        store_b: &dyn ObjectStore,
    ) -> Result<MigrationResult, MigrationError> {
        let keys_a = Self::collect_keys(store_a).await?;
        let keys_b = Self::collect_keys(store_b).await?;

        let (direction, source, destination, keys) = if keys_b.len() > keys_a.len() {
            (Direction::BToA, store_b, store_a, keys_b)
        } else {
            (Direction::AToB, store_a, store_b, keys_a)
        };

        info!(
            source = source.name(),
            destination = destination.name(),
            objects = keys.len(),
            "starting migration run"
        );

        let mut migrated = 0;
        for key in &keys {
            Self::transfer(source, destination, key)
                .await
                .map_err(|(phase, source)| MigrationError {
                    phase,
                    key: Some(key.clone()),
                    migrated,
                    source,
                })?;
            migrated += 1;
        }

        let result = MigrationResult {
            direction,
            source: source.name().to_string(),
            destination: destination.name().to_string(),
            migrated,
        };
        info!(%result, "migration run complete");
        Ok(result)
    }

    /// Materialize one store's listing into keys.
    ///
    /// Counts must be exact to compare sizes, so the whole listing is held
    /// in memory for the run.
    async fn collect_keys(store: &dyn ObjectStore) -> Result<Vec<String>, MigrationError> {
        let map_err = |source| MigrationError {
            phase: MigrationPhase::List,
            key: None,
            migrated: 0,
            source,
        };

        let mut listing = store.list().await.map_err(map_err)?;
        let mut keys = Vec::new();
        while let Some(record) = listing.next().await {
            keys.push(record.map_err(map_err)?.key);
        }
        Ok(keys)
    }

    /// Move one object: copy all bytes, commit the destination, retire the
    /// source copy. The object exists in both places until the final delete.
    async fn transfer(
        source: &dyn ObjectStore,
        destination: &dyn ObjectStore,
        key: &str,
    ) -> Result<(), (MigrationPhase, StorageError)> {
        let mut reader = source
            .reader(key)
            .await
            .map_err(|e| (MigrationPhase::Read, e))?;
        let mut sink = destination
            .writer(key)
            .await
            .map_err(|e| (MigrationPhase::Write, e))?;

        while let Some(chunk) = reader.next().await {
            let chunk = chunk.map_err(|e| (MigrationPhase::Read, e))?;
            sink.write(chunk).await.map_err(|e| (MigrationPhase::Write, e))?;
        }

        sink.close().await.map_err(|e| (MigrationPhase::Write, e))?;

        match source.delete(key).await {
            Ok(()) => Ok(()),
            // Copy already succeeded; a raced deletion of the source object
            // still leaves the run's outcome correct.
            Err(e) if e.is_not_found() => {
                warn!(key, store = source.name(), "object vanished from source after copy");
                Ok(())
            }
            Err(e) => Err((MigrationPhase::Delete, e)),
        }
    }
}
