//! Content digests.
//!
//! Digests are rendered in OCI form, `sha256:<64 lowercase hex chars>`.

use serde::Serialize;
use sha2::{Digest, Sha256};

pub const DIGEST_PREFIX: &str = "sha256:";

/// Digest arbitrary bytes.
pub fn digest_bytes(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  format!("{}{}", DIGEST_PREFIX, hex::encode(hasher.finalize()))
}

/// Digest the JSON serialization of `value`.
pub fn digest_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
  Ok(digest_bytes(&serde_json::to_vec(value)?))
}

/// The hex part of a digest, suitable for file names.
pub fn digest_hex(digest: &str) -> &str {
  digest.strip_prefix(DIGEST_PREFIX).unwrap_or(digest)
}
