//! Opaque tokens: refresh tokens and email confirmation tokens
//!
//! Refresh tokens are 32 random bytes, base64url encoded for the client. Only
//! the SHA-256 hex digest is persisted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const REFRESH_TOKEN_BYTES: usize = 32;
const CONFIRMATION_TOKEN_BYTES: usize = 24;

/// Raw value handed to the client and the digest stored server side
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub raw: String,
    pub hash: String,
}

impl IssuedRefreshToken {
    #[must_use]
    pub fn generate() -> Self {
        let raw = random_token(REFRESH_TOKEN_BYTES);
        let hash = hash_refresh_token(&raw);
        Self { raw, hash }
    }
}

/// SHA-256 hex digest of a raw refresh token
#[must_use]
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[must_use]
pub fn generate_confirmation_token() -> String {
    random_token(CONFIRMATION_TOKEN_BYTES)
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_shape() {
        let issued = IssuedRefreshToken::generate();
        // 32 bytes -> 43 base64url chars without padding
        assert_eq!(issued.raw.len(), 43);
        assert_eq!(issued.hash.len(), 64);
        assert_eq!(issued.hash, hash_refresh_token(&issued.raw));
        assert!(!issued.raw.contains('='));
    }

    #[test]
    fn test_tokens_are_random() {
        assert_ne!(IssuedRefreshToken::generate().raw, IssuedRefreshToken::generate().raw);
        assert_ne!(generate_confirmation_token(), generate_confirmation_token());
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_refresh_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
