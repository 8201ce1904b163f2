//! Account hashing. Public keys arrive already decoded; address handling lives elsewhere.

use sha2::Digest as _;

/// Lower-case hex SHA-256 of `"<nonce>:<public_key>"` (or just the key) followed by `server_seed`.
pub fn account_hash(public_key: &str, nonce: Option<u64>, server_seed: &str) -> String {
    let mut hasher = sha2::Sha256::new();
    if let Some(nonce) = nonce {
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(b":");
    }
    hasher.update(public_key.as_bytes());
    hasher.update(server_seed.as_bytes());
    hex_lower(&hasher.finalize())
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/identity.rs"]
mod tests;
