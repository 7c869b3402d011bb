//! # Offline Verification
//!
//! Verifies a credential or presentation stored in a JSON file and prints
//! the report. Exit status is 0 when verified and 2 when verification
//! failed; unreadable or unclassifiable input is an error.

use std::path::Path;

use anyhow::{Context, Result};
use vcw_lifecycle::{CredentialLifecycle, VerificationReport};

/// Read and verify `path`.
pub async fn verify_file(
    lifecycle: &CredentialLifecycle,
    path: &Path,
) -> Result<VerificationReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    lifecycle
        .verify(document)
        .await
        .with_context(|| format!("cannot verify {}", path.display()))
}

/// Execute `vcw verify <file>`.
pub async fn run_verify(lifecycle: &CredentialLifecycle, path: &Path) -> Result<u8> {
    let report = verify_file(lifecycle, path).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.verified {
        println!("OK: {} verified", report.kind);
        Ok(0)
    } else {
        println!("FAIL: {} did not verify", report.kind);
        Ok(2)
    }
}
