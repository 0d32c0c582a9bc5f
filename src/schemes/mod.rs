//! Signature schemes.
//!
//! This module contains the trait for keyed-hash primitives and the signing
//! step of the pipeline: building the canonical message from the ordered
//! parameters and encoding the digest.

pub mod hmac;

use crate::contract::{GatewayContract, SignatureAlgorithm};
use crate::errors::Result;
use crate::params::Parameters;
use std::sync::Arc;

/// Trait for keyed-hash primitives used to sign the canonical message.
///
/// Implementations must be pure: the same key and message always give the
/// same digest.
pub trait SignatureScheme: Send + Sync {
    /// Returns the name of this scheme (e.g., "hmac-sha256").
    fn name(&self) -> &str;

    /// Computes the raw digest of `message` keyed with `secret`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SigningFailure`](crate::GatewayError::SigningFailure)
    /// if the primitive cannot be initialised.
    fn digest(&self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>>;
}

/// Returns the scheme implementing `algorithm`.
pub fn scheme_for(algorithm: SignatureAlgorithm) -> Arc<dyn SignatureScheme> {
    match algorithm {
        SignatureAlgorithm::HmacSha256 => Arc::new(self::hmac::HmacSha256::new()),
        SignatureAlgorithm::HmacSha3_256 => Arc::new(self::hmac::HmacSha3_256::new()),
    }
}

/// Joins the signed values in canonical order with the contract's separator.
///
/// Keys are not part of the message, and a separator inside a value is not
/// escaped. `Reference="A|B"` alone signs the same bytes as `Reference="A"`
/// followed by `custom1="B"`, so the signature does not bind a value to its
/// key. Callers that let payers choose values should reject the separator
/// themselves or pick one that cannot occur.
///
/// # Examples
///
/// ```
/// use flexpay::contract::GatewayContract;
/// use flexpay::params::Parameters;
/// use flexpay::schemes::canonical_message;
///
/// let mut params = Parameters::new();
/// params.push("MerchantId", "7");
/// params.push("Amount", "10.00");
/// params.push_unsigned("email", "buyer@example.com");
///
/// assert_eq!(canonical_message(&params, &GatewayContract::default()), "7|10.00");
/// ```
pub fn canonical_message(parameters: &Parameters, contract: &GatewayContract) -> String {
    parameters
        .signed_values()
        .collect::<Vec<_>>()
        .join(contract.separator.as_str())
}

/// Signs the parameters with the shared secret.
///
/// # Examples
///
/// ```
/// use flexpay::contract::GatewayContract;
/// use flexpay::params::Parameters;
/// use flexpay::schemes::{hmac::HmacSha256, sign};
///
/// let mut params = Parameters::new();
/// params.push("MerchantId", "7");
/// params.push("Amount", "10.00");
/// params.push("Currency", "AUD");
/// params.push("Reference", "Foo");
///
/// let signature = sign(&params, "xxx", &HmacSha256::new(), &GatewayContract::default()).unwrap();
/// assert_eq!(signature, "E558B3C2DA9DD66A1AC56754D75636ED61D1C40EFB76D6F982198AA90A8FD4FC");
/// ```
pub fn sign(
    parameters: &Parameters,
    shared_secret: &str,
    scheme: &dyn SignatureScheme,
    contract: &GatewayContract,
) -> Result<String> {
    let message = canonical_message(parameters, contract);
    tracing::trace!(scheme = scheme.name(), message = %message, "signing canonical message");

    let digest = scheme.digest(shared_secret.as_bytes(), message.as_bytes())?;
    Ok(contract.encoding.encode(&digest))
}
