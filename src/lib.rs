//! Keeps two object-storage buckets level by migrating all objects from
//! whichever bucket holds more content into the other, then deleting them
//! from the source.
//!
//! The pieces, leaves first:
//!
//! - [`retry`] — exponential backoff with a permanent-failure escape hatch.
//! - [`gate`] — per-provider readiness probing; blocks until a bucket is
//!   reachable with current credentials.
//! - [`storage`] — the capability interface over heterogeneous providers
//!   (S3, GCS, local filesystem, memory) and its OpenDAL implementation.
//! - [`migrate`] — the enumerate → copy → close → delete engine.
//! - [`config`] — YAML configuration for both providers and retry pacing.
//!
//! The hosting process (see `src/main.rs`) loads configuration, gates both
//! providers concurrently, and hands the ready handles to the engine.

pub mod config;
pub mod gate;
pub mod migrate;
pub mod retry;
pub mod storage;
