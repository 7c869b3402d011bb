//! # Key Backfill
//!
//! Gives every user without a signing key a fresh one. Existing keys are
//! never replaced, so the command can be rerun at any time.

use anyhow::{Context, Result};
use vcw_lifecycle::CredentialLifecycle;

/// Run the backfill and report how many keys were written.
pub async fn run_backfill(lifecycle: &CredentialLifecycle) -> Result<u8> {
    let filled = lifecycle
        .backfill_keys()
        .await
        .context("key backfill failed")?;
    if filled == 0 {
        println!("OK: every user already has a signing key");
    } else {
        println!("OK: generated signing keys for {filled} user(s)");
    }
    Ok(0)
}
