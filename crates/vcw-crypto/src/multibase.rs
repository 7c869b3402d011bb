//! Multibase base58btc (`z` prefix), the text encoding used for did:key
//! values, proof values, and stored key material.

/// Encode bytes as `z<base58btc>`.
pub fn encode(bytes: &[u8]) -> String {
    format!("z{}", bs58::encode(bytes).into_string())
}

/// Decode a `z<base58btc>` string.
pub fn decode(value: &str) -> Result<Vec<u8>, String> {
    let encoded = value
        .strip_prefix('z')
        .ok_or_else(|| "multibase value must be base58btc ('z')".to_string())?;
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| format!("base58 decode failed: {e}"))
}

/// Decode into exactly `N` bytes.
pub(crate) fn decode_array<const N: usize>(value: &str) -> Result<[u8; N], String> {
    let bytes = decode(value)?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected {N} bytes, got {}", b.len()))
}
