//! # did:key for Ed25519
//!
//! `did:key:z<base58btc(0xed 0x01 || public_key)>`. The verification
//! method for a key is the DID with its own multibase value as fragment,
//! so a verifier can recover the public key from the proof alone.
//!
//! Only the Ed25519 multicodec is understood. Anything else fails to
//! resolve.

use crate::ed25519::Ed25519PublicKey;
use crate::error::CryptoError;
use crate::multibase;

const DID_KEY_PREFIX: &str = "did:key:";
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Derive the `did:key` identifier of a public key.
pub fn did_key(public_key: &Ed25519PublicKey) -> String {
    format!("{DID_KEY_PREFIX}{}", multibase_value(public_key))
}

/// Derive the verification method DID URL (`did:key:z…#z…`).
pub fn verification_method(public_key: &Ed25519PublicKey) -> String {
    let mb = multibase_value(public_key);
    format!("{DID_KEY_PREFIX}{mb}#{mb}")
}

/// Resolve a `did:key` DID or DID URL back to its Ed25519 public key.
pub fn public_key_from_did_url(did_url: &str) -> Result<Ed25519PublicKey, CryptoError> {
    let unresolvable = |reason: &str| CryptoError::UnresolvableDid {
        did: did_url.to_string(),
        reason: reason.to_string(),
    };

    let did = did_url.split('#').next().unwrap_or_default();
    let mb = did
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| unresolvable("not a did:key identifier"))?;
    let decoded = multibase::decode(mb).map_err(|e| unresolvable(&e))?;

    if decoded.len() != 34 || decoded[..2] != ED25519_MULTICODEC {
        return Err(unresolvable("not an Ed25519 public key multicodec"));
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&decoded[2..]);
    Ok(Ed25519PublicKey::from_bytes(bytes))
}

fn multibase_value(public_key: &Ed25519PublicKey) -> String {
    let mut buf = Vec::with_capacity(34);
    buf.extend_from_slice(&ED25519_MULTICODEC);
    buf.extend_from_slice(public_key.as_bytes());
    multibase::encode(&buf)
}
