//! # flexpay-rs
//!
//! Signed redirect URLs for hosted payment pages.
//!
//! A merchant never collects card details itself. It sends the payer's browser
//! to the gateway's order page with the price, currency and description in the
//! query string, plus a signature computed with a secret shared between the
//! merchant and the gateway. The gateway recomputes the signature and refuses
//! to render the page if anything was tampered with.
//!
//! This crate builds those URLs. It performs no I/O: every operation is a pure
//! function of the credentials, configuration and request.
//!
//! ## Features
//!
//! - **Purchases**: one-off order pages with optional pass-through fields
//! - **Subscriptions**: recurring or one-time subscriptions, trials and upgrades
//! - **Lookups**: sale status and subscription cancellation URLs
//! - **Configurable contract**: parameter names, separator, HMAC-SHA256 or
//!   HMAC-SHA3-256, hex or base64 signatures
//! - **Brands**: Verotel, CardBilling, BitsafePay and their sister brands
//!
//! ## Quick Start
//!
//! ```rust
//! use flexpay::client::GatewayClient;
//! use flexpay::request::PurchaseRequest;
//! use flexpay::types::{Currency, MerchantCredentials};
//! use rust_decimal::Decimal;
//!
//! # fn example() -> flexpay::Result<()> {
//! let client = GatewayClient::with_defaults(MerchantCredentials::new("65147", "mySecret")?);
//!
//! let request = PurchaseRequest::builder()
//!     .amount(Decimal::new(2599, 2), Currency::Eur)
//!     .reference("Extra comfy XL pyjamas")
//!     .success_url("https://shop.example.com/thanks")
//!     .build()?;
//!
//! let url = client.purchase_url(&request)?;
//! println!("Pay here: {}", url);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Signing
//!
//! 1. **Build**: the request becomes an ordered list of parameters: merchant id,
//!    amount, currency, reference, then extra fields in the order supplied
//! 2. **Sign**: the signed values are joined with `|` and run through
//!    HMAC-SHA256 keyed with the shared secret, rendered as uppercase hex
//! 3. **Assemble**: keys and values are form-urlencoded and appended to the
//!    page's base path, signature last
//!
//! Reordering the parameters changes the signature, so the order is part of
//! the gateway contract.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod assemble;
pub mod client;
pub mod contract;
pub mod errors;
pub mod params;
pub mod request;
pub mod schemes;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use client::{ClientConfig, GatewayClient};
pub use contract::{GatewayContract, SignatureAlgorithm, SignatureEncoding, SpaceEncoding};
pub use errors::{GatewayError, Result};
pub use request::{PurchaseRequest, PurchaseRequestBuilder, SubscriptionRequest};
pub use types::{
    Brand, Currency, MerchantCredentials, PaymentMethod, SignedUrl, SubscriptionType,
    UpgradeOption, UrlKind,
};
