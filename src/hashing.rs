//! Document Hashing - SHA-256 Fingerprints
//!
//! Identical stanza trees render to identical bytes, so the hash of the
//! rendered text identifies a job revision.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Fingerprint of a rendered job document.
pub fn document_hash(document: &str) -> String {
    sha256_hex(document.as_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_document_hash_tracks_content() {
        let a = document_hash("job \"a\" {\n}\n");
        let b = document_hash("job \"b\" {\n}\n");
        assert_eq!(a.len(), 64);
        assert_eq!(a, document_hash("job \"a\" {\n}\n"));
        assert_ne!(a, b);
    }
}
