//! SHA-256 helpers for cache keys and content fingerprints.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Build a namespaced cache key from the JSON serialization of `input`.
///
/// Field order follows the struct definition, so two equal inputs always
/// produce the same key.
///
/// # Errors
///
/// Returns the serialization error for inputs JSON cannot represent, such
/// as maps with non-string keys.
pub fn cache_key<T: Serialize>(namespace: &str, input: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(input)?;
    Ok(format!("{namespace}:{}", sha256_hex(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn cache_key_is_namespaced_and_stable() {
        let a = cache_key("direction", &("hello", "youtube")).unwrap();
        let b = cache_key("direction", &("hello", "youtube")).unwrap();
        let c = cache_key("direction", &("hello", "tiktok")).unwrap();

        assert!(a.starts_with("direction:"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), "direction:".len() + 64);
    }

    #[test]
    fn cache_key_rejects_unserializable_input() {
        let mut input = std::collections::HashMap::new();
        input.insert((1, 2), "non-string map key");

        assert!(cache_key("direction", &input).is_err());
    }
}
