//! Example flexpay client.
//!
//! This example prints a signed purchase URL for the merchant configured in
//! the environment. Open it in a browser to see the gateway's order page.
//!
//! Run with:
//! ```bash
//! cargo run --example purchase_url -- 25.99 EUR "Extra comfy XL pyjamas"
//! ```
//!
//! Environment variables (a `.env` file is read too):
//! - FLEXPAY_MERCHANT_ID: Your website/shop id
//! - FLEXPAY_SECRET: The signature key shared with the gateway
//! - FLEXPAY_BRAND: Optional brand name (verotel, cardbilling, bitsafepay, ...)
//! - FLEXPAY_ALGORITHM: Optional signature algorithm (hmac-sha256, hmac-sha3-256)

use anyhow::Context;
use flexpay::client::{ClientConfig, GatewayClient};
use flexpay::contract::GatewayContract;
use flexpay::request::PurchaseRequest;
use flexpay::types::{Brand, MerchantCredentials};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let merchant_id =
        std::env::var("FLEXPAY_MERCHANT_ID").context("FLEXPAY_MERCHANT_ID is not set")?;
    let secret = std::env::var("FLEXPAY_SECRET").context("FLEXPAY_SECRET is not set")?;

    let brand = match std::env::var("FLEXPAY_BRAND") {
        Ok(name) => Brand::from_name(&name)?,
        Err(_) => Brand::default(),
    };

    let mut contract = GatewayContract::default();
    if let Ok(algorithm) = std::env::var("FLEXPAY_ALGORITHM") {
        contract = contract.with_algorithm(algorithm.parse()?);
    }

    let mut args = std::env::args().skip(1);
    let amount = args.next().unwrap_or_else(|| "25.99".to_string());
    let currency = args.next().unwrap_or_else(|| "EUR".to_string());
    let reference = args.next().unwrap_or_else(|| "Extra comfy XL pyjamas".to_string());

    let client = GatewayClient::new(
        MerchantCredentials::new(merchant_id, secret)?,
        ClientConfig::new().with_brand(brand).with_contract(contract),
    )?;

    let request = PurchaseRequest::builder()
        .amount_str(&amount)?
        .currency_code(&currency)?
        .reference(reference)
        .build()?;

    let url = client.purchase_url(&request)?;
    println!("{}", url);

    Ok(())
}
