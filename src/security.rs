//! Cryptographic primitives used for cookie authentication and CSRF tokens.

use crate::error::BoxError;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex encoded SHA-256 tag.
const TAG_LEN: usize = 64;

/// The security operations a [`Request`](crate::Request) relies on.
///
/// [`HmacSecurity`] is used unless an [`App`](crate::App) is configured
/// with another implementation.
pub trait Security: Send + Sync {
    /// Generate a new random CSRF token.
    fn random_token(&self) -> Result<String, BoxError>;

    /// Prefix `data` with a message authentication code keyed by `key`.
    fn hash_data(&self, data: &str, key: &str) -> Result<String, BoxError>;

    /// Verify data produced by [`hash_data`](Self::hash_data), returning the
    /// authenticated payload, or `None` if it was tampered with.
    fn validate_data(&self, data: &str, key: &str) -> Option<String>;

    /// Mask a token so that repeated transmissions never look alike.
    fn mask_token(&self, token: &str) -> Result<String, BoxError>;

    /// Reverse [`mask_token`](Self::mask_token). Returns `None` for input
    /// that is not a masked token.
    fn unmask_token(&self, masked: &str) -> Option<String>;
}

/// HMAC-SHA256 signing and XOR masking backed by the OS random source.
///
/// Signed data is `hex(hmac(data)) + data`. A masked token is the
/// URL-safe base64 encoding of `mask + (mask ^ token)`, with a fresh
/// random mask each time.
#[derive(Clone, Debug)]
pub struct HmacSecurity {
    token_length: usize,
}

impl HmacSecurity {
    pub fn new() -> Self {
        Self { token_length: 32 }
    }

    /// Set the length of generated tokens, in characters.
    ///
    /// By default tokens are 32 characters long.
    pub fn token_length(mut self, length: usize) -> Self {
        self.token_length = length;
        self
    }

    fn mac(data: &str, key: &str) -> Result<HmacSha256, BoxError> {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|_| BoxError::from("invalid HMAC key length"))?;
        mac.update(data.as_bytes());
        Ok(mac)
    }
}

impl Default for HmacSecurity {
    fn default() -> Self {
        Self::new()
    }
}

impl Security for HmacSecurity {
    fn random_token(&self) -> Result<String, BoxError> {
        let mut bytes = vec![0; self.token_length];
        OsRng.try_fill_bytes(&mut bytes)?;

        let mut token = URL_SAFE_NO_PAD.encode(&bytes);
        token.truncate(self.token_length);
        Ok(token)
    }

    fn hash_data(&self, data: &str, key: &str) -> Result<String, BoxError> {
        let tag = Self::mac(data, key)?.finalize().into_bytes();
        Ok(format!("{}{}", hex::encode(tag), data))
    }

    fn validate_data(&self, data: &str, key: &str) -> Option<String> {
        let (tag, payload) = (data.get(..TAG_LEN)?, data.get(TAG_LEN..)?);
        let tag = hex::decode(tag).ok()?;

        // constant time comparison
        Self::mac(payload, key).ok()?.verify_slice(&tag).ok()?;
        Some(payload.to_owned())
    }

    fn mask_token(&self, token: &str) -> Result<String, BoxError> {
        let mut mask = vec![0; token.len()];
        OsRng.try_fill_bytes(&mut mask)?;

        let masked = xor(token.as_bytes(), &mask);
        mask.extend(masked);
        Ok(URL_SAFE.encode(mask))
    }

    fn unmask_token(&self, masked: &str) -> Option<String> {
        let decoded = URL_SAFE.decode(masked).ok()?;

        if decoded.len() % 2 != 0 {
            return None;
        }

        let (mask, token) = decoded.split_at(decoded.len() / 2);
        String::from_utf8(xor(token, mask)).ok()
    }
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(a, b)| a ^ b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_validate() {
        let security = HmacSecurity::new();
        let signed = security.hash_data("payload", "key").unwrap();

        assert_eq!(signed.len(), TAG_LEN + "payload".len());
        assert_eq!(
            security.validate_data(&signed, "key").as_deref(),
            Some("payload")
        );
        assert_eq!(security.validate_data(&signed, "other key"), None);
        assert_eq!(security.validate_data("short", "key"), None);
    }

    #[test]
    fn random_tokens() {
        let security = HmacSecurity::new().token_length(20);
        let a = security.random_token().unwrap();
        let b = security.random_token().unwrap();

        assert_eq!(a.len(), 20);
        assert_ne!(a, b);
        assert!(a
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn unmask_garbage() {
        let security = HmacSecurity::new();
        assert_eq!(security.unmask_token("not base64!"), None);
        // three bytes cannot be split into mask and token
        assert_eq!(security.unmask_token(&URL_SAFE.encode([1, 2, 3])), None);
    }
}
