//! # Lifecycle Configuration

use std::time::Duration;

/// University recorded when an issuance request names none.
pub const DEFAULT_UNIVERSITY: &str = "Universidade de Aveiro";

/// Tunables for [`CredentialLifecycle`](crate::CredentialLifecycle).
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Upper bound on a single signing-service call.
    pub signing_timeout: Duration,
    /// How many times issuance re-signs and retries persistence after a
    /// transient store failure.
    pub store_retries: u32,
    /// University used when the claim omits one.
    pub default_university: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            signing_timeout: Duration::from_millis(5000),
            store_retries: 1,
            default_university: DEFAULT_UNIVERSITY.to_string(),
        }
    }
}
