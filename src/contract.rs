//! The externally fixed part of the design: parameter names, canonical
//! message layout, hash algorithm and output encodings the gateway checks.
//!
//! Changing any value here changes every signature the crate produces, so a
//! contract must match the gateway's published signing rules exactly.

use crate::errors::{GatewayError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default name of the merchant id parameter.
pub const DEFAULT_MERCHANT_ID_PARAM: &str = "MerchantId";
/// Default name of the amount parameter.
pub const DEFAULT_AMOUNT_PARAM: &str = "Amount";
/// Default name of the currency parameter.
pub const DEFAULT_CURRENCY_PARAM: &str = "Currency";
/// Default name of the reference (description) parameter.
pub const DEFAULT_REFERENCE_PARAM: &str = "Reference";
/// Default name of the signature parameter.
pub const DEFAULT_SIGNATURE_PARAM: &str = "Signature";
/// Default separator placed between signed values.
pub const DEFAULT_SEPARATOR: &str = "|";

/// Keyed-hash algorithm used for the signature.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// HMAC with SHA-256
    #[default]
    HmacSha256,
    /// HMAC with SHA3-256
    #[serde(rename = "hmac-sha3-256")]
    HmacSha3_256,
}

impl SignatureAlgorithm {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::HmacSha256 => "hmac-sha256",
            SignatureAlgorithm::HmacSha3_256 => "hmac-sha3-256",
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        [SignatureAlgorithm::HmacSha256, SignatureAlgorithm::HmacSha3_256]
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GatewayError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Text encoding of the signature digest.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureEncoding {
    /// Uppercase hexadecimal
    #[default]
    UpperHex,
    /// Lowercase hexadecimal
    LowerHex,
    /// Standard base64 with padding
    Base64,
}

impl SignatureEncoding {
    /// Encodes a raw digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexpay::contract::SignatureEncoding;
    ///
    /// assert_eq!(SignatureEncoding::UpperHex.encode(&[0xab, 0x01]), "AB01");
    /// assert_eq!(SignatureEncoding::LowerHex.encode(&[0xab, 0x01]), "ab01");
    /// assert_eq!(SignatureEncoding::Base64.encode(&[0xab, 0x01]), "qwE=");
    /// ```
    pub fn encode(&self, digest: &[u8]) -> String {
        match self {
            SignatureEncoding::UpperHex => hex::encode_upper(digest),
            SignatureEncoding::LowerHex => hex::encode(digest),
            SignatureEncoding::Base64 => BASE64.encode(digest),
        }
    }
}

/// How a space is written in the query string.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpaceEncoding {
    /// `+`, as in HTML form submissions
    #[default]
    Plus,
    /// `%20`
    Percent,
}

/// Everything about the URL and signature that the gateway dictates.
///
/// The defaults describe the scheme `HMAC-SHA256(secret, "7|10.00|AUD|Foo")`
/// rendered as uppercase hex, sent as
/// `MerchantId=7&Amount=10.00&Currency=AUD&Reference=Foo&Signature=...`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayContract {
    /// Name of the merchant id parameter (default `MerchantId`)
    pub merchant_id_param: String,

    /// Name of the amount parameter (default `Amount`)
    pub amount_param: String,

    /// Name of the currency parameter (default `Currency`)
    pub currency_param: String,

    /// Name of the reference parameter (default `Reference`)
    pub reference_param: String,

    /// Name of the signature parameter (default `Signature`)
    pub signature_param: String,

    /// String placed between signed values (default `|`, may be empty)
    pub separator: String,

    /// Keyed-hash algorithm (default HMAC-SHA256)
    pub algorithm: SignatureAlgorithm,

    /// Digest encoding (default uppercase hex)
    pub encoding: SignatureEncoding,

    /// Space convention in the query string (default `+`)
    pub spaces: SpaceEncoding,
}

impl Default for GatewayContract {
    fn default() -> Self {
        Self {
            merchant_id_param: DEFAULT_MERCHANT_ID_PARAM.to_string(),
            amount_param: DEFAULT_AMOUNT_PARAM.to_string(),
            currency_param: DEFAULT_CURRENCY_PARAM.to_string(),
            reference_param: DEFAULT_REFERENCE_PARAM.to_string(),
            signature_param: DEFAULT_SIGNATURE_PARAM.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            algorithm: SignatureAlgorithm::default(),
            encoding: SignatureEncoding::default(),
            spaces: SpaceEncoding::default(),
        }
    }
}

impl GatewayContract {
    /// Sets the separator placed between signed values.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the keyed-hash algorithm.
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the digest encoding.
    pub fn with_encoding(mut self, encoding: SignatureEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the space convention.
    pub fn with_spaces(mut self, spaces: SpaceEncoding) -> Self {
        self.spaces = spaces;
        self
    }

    /// Sets the name of the signature parameter.
    pub fn with_signature_param(mut self, name: impl Into<String>) -> Self {
        self.signature_param = name.into();
        self
    }

    /// Parameter names the caller may not reuse for extra fields.
    pub fn reserved_names(&self) -> [&str; 5] {
        [
            self.merchant_id_param.as_str(),
            self.amount_param.as_str(),
            self.currency_param.as_str(),
            self.reference_param.as_str(),
            self.signature_param.as_str(),
        ]
    }
}
