//! HMAC-based signature schemes.

use crate::errors::{GatewayError, Result};
use crate::schemes::SignatureScheme;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};

fn mac_digest<M: Mac + KeyInit>(secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| GatewayError::SigningFailure(format!("cannot initialise HMAC: {}", e)))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC with SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256;

impl HmacSha256 {
    /// Creates the scheme.
    pub fn new() -> Self {
        Self
    }
}

impl SignatureScheme for HmacSha256 {
    fn name(&self) -> &str {
        "hmac-sha256"
    }

    fn digest(&self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        mac_digest::<Hmac<sha2::Sha256>>(secret, message)
    }
}

/// HMAC with SHA3-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha3_256;

impl HmacSha3_256 {
    /// Creates the scheme.
    pub fn new() -> Self {
        Self
    }
}

impl SignatureScheme for HmacSha3_256 {
    fn name(&self) -> &str {
        "hmac-sha3-256"
    }

    fn digest(&self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        mac_digest::<Hmac<sha3::Sha3_256>>(secret, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_rfc4231_case_2() {
        let digest = HmacSha256::new()
            .digest(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            hex::encode(digest),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(HmacSha256::new().digest(b"k", b"m").unwrap().len(), 32);
        assert_eq!(HmacSha3_256::new().digest(b"k", b"m").unwrap().len(), 32);
    }

    #[test]
    fn test_empty_key_is_accepted() {
        assert!(HmacSha256::new().digest(b"", b"message").is_ok());
    }

    #[test]
    fn test_algorithms_differ() {
        let a = HmacSha256::new().digest(b"xxx", b"7|10.00|AUD|Foo").unwrap();
        let b = HmacSha3_256::new().digest(b"xxx", b"7|10.00|AUD|Foo").unwrap();
        assert_ne!(a, b);
    }
}
