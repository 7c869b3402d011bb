//! # Issuer Dashboard
//!
//! Read-only aggregation over an issuer's own credentials and revocations.

use serde::{Deserialize, Serialize};
use vcw_core::UserId;

use crate::store::{CredentialStore, StoreError};

/// Number of activity lines shown.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Credentials issued.
    pub credentials_issued: u64,
    /// Distinct holders issued to.
    pub active_students: u64,
    /// Revoked credentials among those issued.
    pub revoked_credentials: u64,
}

/// Dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    /// Headline counts.
    pub stats: DashboardStats,
    /// Most recent issuances, newest first.
    pub recent_activity: Vec<String>,
}

/// Build the dashboard for `issuer`.
pub async fn issuer_dashboard(
    store: &dyn CredentialStore,
    issuer: UserId,
) -> Result<DashboardData, StoreError> {
    let stats = store.issuer_stats(issuer).await?;
    let recent = store.recent_issuances(issuer, RECENT_ACTIVITY_LIMIT).await?;
    Ok(DashboardData {
        stats: DashboardStats {
            credentials_issued: stats.credentials_issued,
            active_students: stats.active_students,
            revoked_credentials: stats.revoked_credentials,
        },
        recent_activity: recent
            .into_iter()
            .map(|e| format!("Issued \"{}\" to {}", e.title, e.holder_email))
            .collect(),
    })
}
