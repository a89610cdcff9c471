//! Credential gate.
//!
//! Each provider's bucket must be confirmed reachable before any traffic is
//! sent to it. The gate repeatedly constructs a fresh handle and probes it
//! under a [`BackoffPolicy`], absorbing transient failures ("credentials do
//! not exist yet") and aborting on permanent ones (malformed configuration,
//! hard auth rejection). A handle is rebuilt on every attempt: some provider
//! SDKs cache a negative auth result taken before the credentials existed,
//! and a reused handle would stay poisoned.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::retry::{BackoffPolicy, RetryError};
use crate::storage::{gcs, BoxedObjectStore, StorageError, StorageType, StoreConfig, StoreFactory};

/// Readiness of one provider. `Ready` and `Failed` are terminal for the
/// process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    /// Probe has not succeeded yet; retries continue.
    Pending,
    /// Bucket confirmed reachable; the handle has been handed over.
    Ready,
    /// Permanent failure; no further probes.
    Failed(String),
}

impl ReadinessState {
    /// True once the state can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReadinessState::Pending)
    }

    /// A retryable probe failure leaves the state unchanged.
    pub fn observe_transient(self) -> Self {
        self
    }

    /// A successful probe moves `Pending` to `Ready`.
    pub fn observe_ready(self) -> Self {
        if self.is_terminal() {
            self
        } else {
            ReadinessState::Ready
        }
    }

    /// A permanent probe failure moves `Pending` to `Failed`.
    pub fn observe_failed(self, reason: String) -> Self {
        if self.is_terminal() {
            self
        } else {
            ReadinessState::Failed(reason)
        }
    }
}

/// Errors that escape the gate. Transient probe failures never do; only the
/// final permanent outcome surfaces.
#[derive(Debug, Error)]
pub enum GateError {
    /// The configuration cannot produce a usable handle; retrying is useless.
    #[error("configuration rejected for provider \"{provider}\": {reason}")]
    Config { provider: String, reason: String },

    /// The bucket stayed unreachable past the policy's attempt ceiling, or
    /// the rejection was classified as permanent.
    #[error("bucket for provider \"{provider}\" was not reachable with credentials")]
    Unreachable {
        provider: String,
        #[source]
        source: StorageError,
    },
}

/// One readiness probe: construct a handle and confirm reachability.
///
/// Implementations classify their failures; the gate only paces attempts.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Provider label, for logs and errors.
    fn provider(&self) -> &str;

    /// Attempt to produce a reachable store handle.
    async fn connect(&self) -> Result<BoxedObjectStore, RetryError<GateError>>;
}

/// Production connector: factory-built handle plus reachability check,
/// reconstructed from configuration on every attempt.
pub struct ProviderConnector {
    config: StoreConfig,
}

impl ProviderConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Credentials precheck, before a handle is worth building. Only GCS
    /// materializes credentials as a file that can be watched for; S3 keeps
    /// its secret in the environment, so the reachability probe is its whole
    /// check. A missing file is the normal "credentials not provisioned yet"
    /// case and stays retryable.
    fn precheck(&self) -> Result<(), RetryError<GateError>> {
        if !self.config.storage_type().requires_credentials() {
            return Ok(());
        }
        if self.config.storage_type() != StorageType::Gcs {
            return Ok(());
        }

        let path = gcs::credentials_path(&self.config).map_err(|e| {
            RetryError::Permanent(GateError::Config {
                provider: self.config.name.clone(),
                reason: e.to_string(),
            })
        })?;

        if path.exists() {
            Ok(())
        } else {
            Err(RetryError::Transient(GateError::Unreachable {
                provider: self.config.name.clone(),
                source: StorageError::Config(format!(
                    "credentials file {} not present",
                    path.display()
                )),
            }))
        }
    }
}

#[async_trait]
impl StoreConnector for ProviderConnector {
    fn provider(&self) -> &str {
        &self.config.name
    }

    async fn connect(&self) -> Result<BoxedObjectStore, RetryError<GateError>> {
        self.precheck()?;

        let store = StoreFactory::create(&self.config).map_err(|e| {
            RetryError::Permanent(GateError::Config {
                provider: self.config.name.clone(),
                reason: e.to_string(),
            })
        })?;

        match store.check().await {
            Ok(()) => Ok(store),
            Err(e) => Err(RetryError::Transient(GateError::Unreachable {
                provider: self.config.name.clone(),
                source: e,
            })),
        }
    }
}

/// Blocks callers until a provider's bucket is reachable.
pub struct CredentialGate {
    policy: BackoffPolicy,
}

impl CredentialGate {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    /// Probe under backoff until the connector produces a handle or fails
    /// permanently. Gates for different providers are independent and may
    /// run concurrently.
    pub async fn await_ready(
        &self,
        connector: &dyn StoreConnector,
    ) -> Result<BoxedObjectStore, GateError> {
        let provider = connector.provider().to_string();
        let state = Mutex::new(ReadinessState::Pending);

        let state_ref = &state;
        let provider_ref = provider.as_str();
        let result = self
            .policy
            .retry(move |_failures| async move {
                match connector.connect().await {
                    Ok(store) => {
                        let mut s = state_ref.lock().await;
                        *s = s.clone().observe_ready();
                        Ok(store)
                    }
                    Err(RetryError::Transient(e)) => {
                        let mut s = state_ref.lock().await;
                        *s = s.clone().observe_transient();
                        info!(provider = provider_ref, "waiting for credentials: {e}");
                        Err(RetryError::Transient(e))
                    }
                    Err(RetryError::Permanent(e)) => {
                        let mut s = state_ref.lock().await;
                        *s = s.clone().observe_failed(e.to_string());
                        Err(RetryError::Permanent(e))
                    }
                }
            })
            .await;

        let final_state = state.into_inner();
        debug!(provider = provider.as_str(), ?final_state, "gate finished");

        match result {
            Ok(store) => {
                info!(provider = provider.as_str(), "credentials present, bucket reachable");
                Ok(store)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreParams;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn pending_moves_to_ready() {
        let state = ReadinessState::Pending.observe_ready();
        assert_eq!(state, ReadinessState::Ready);
    }

    #[test]
    fn transient_leaves_pending() {
        let state = ReadinessState::Pending.observe_transient();
        assert_eq!(state, ReadinessState::Pending);
    }

    #[test]
    fn terminal_states_absorb_later_observations() {
        let ready = ReadinessState::Ready;
        assert_eq!(ready.clone().observe_failed("late".into()), ready);

        let failed = ReadinessState::Failed("denied".into());
        assert_eq!(failed.clone().observe_ready(), failed);
    }

    fn gcs_connector(credentials_path: Option<std::path::PathBuf>) -> ProviderConnector {
        ProviderConnector::new(StoreConfig::new(
            "gcp",
            StoreParams::Gcs {
                bucket: "backup".to_string(),
                credentials_path,
            },
        ))
    }

    #[test]
    fn missing_gcs_credentials_file_is_a_transient_failure() {
        let dir = tempfile::tempdir().unwrap();
        let connector = gcs_connector(Some(dir.path().join("creds.json")));

        let err = connector.precheck().unwrap_err();
        assert!(matches!(err, RetryError::Transient(_)));
        assert!(matches!(err.into_inner(), GateError::Unreachable { .. }));
    }

    #[test]
    fn present_gcs_credentials_file_passes_the_precheck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "{}").unwrap();

        let connector = gcs_connector(Some(path));
        assert!(connector.precheck().is_ok());
    }

    #[test]
    fn backends_without_credentials_skip_the_precheck() {
        let connector = ProviderConnector::new(StoreConfig::new("mem", StoreParams::Memory));
        assert!(connector.precheck().is_ok());
    }

    enum Outcome {
        Succeed,
        Transient,
        Permanent,
    }

    struct FakeConnector {
        outcomes: Mutex<VecDeque<Outcome>>,
        calls: AtomicUsize,
    }

    impl FakeConnector {
        fn new(outcomes: Vec<Outcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StoreConnector for FakeConnector {
        fn provider(&self) -> &str {
            "fake"
        }

        async fn connect(&self) -> Result<BoxedObjectStore, RetryError<GateError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self
                .outcomes
                .lock()
                .await
                .pop_front()
                .expect("connector called more times than scripted");
            match outcome {
                Outcome::Succeed => {
                    let config = StoreConfig::new("fake", StoreParams::Memory);
                    Ok(StoreFactory::create(&config).expect("memory store"))
                }
                Outcome::Transient => Err(RetryError::Transient(GateError::Unreachable {
                    provider: "fake".to_string(),
                    source: StorageError::Config("credentials missing".to_string()),
                })),
                Outcome::Permanent => Err(RetryError::Permanent(GateError::Config {
                    provider: "fake".to_string(),
                    reason: "malformed bucket url".to_string(),
                })),
            }
        }
    }

    fn gate() -> CredentialGate {
        CredentialGate::new(BackoffPolicy::immediate())
    }

    #[tokio::test]
    async fn returns_handle_after_exactly_n_transient_failures() {
        let connector = FakeConnector::new(vec![
            Outcome::Transient,
            Outcome::Transient,
            Outcome::Transient,
            Outcome::Succeed,
        ]);
        let store = gate().await_ready(&connector).await.unwrap();
        assert_eq!(store.name(), "fake");
        assert_eq!(connector.calls(), 4);
    }

    #[tokio::test]
    async fn permanent_failure_aborts_without_further_attempts() {
        let connector = FakeConnector::new(vec![Outcome::Permanent, Outcome::Succeed]);
        let err = gate()
            .await_ready(&connector)
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, GateError::Config { .. }));
        assert_eq!(connector.calls(), 1);
    }

    #[tokio::test]
    async fn attempt_ceiling_surfaces_the_last_transient_error() {
        let policy = BackoffPolicy {
            max_attempts: Some(2),
            ..BackoffPolicy::immediate()
        };
        let connector = FakeConnector::new(vec![Outcome::Transient, Outcome::Transient]);
        let err = CredentialGate::new(policy)
            .await_ready(&connector)
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, GateError::Unreachable { .. }));
        assert_eq!(connector.calls(), 2);
    }
}
