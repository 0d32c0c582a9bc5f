//! Client-side entry point.
//!
//! [`GatewayClient`] owns the merchant credentials and configuration and runs
//! the pipeline: build parameters, sign them, assemble the URL. It holds no
//! mutable state and can be shared across threads.

use crate::assemble::assemble;
use crate::contract::GatewayContract;
use crate::errors::{GatewayError, Result};
use crate::params::{self, Parameters};
use crate::request::{PurchaseRequest, SubscriptionRequest};
use crate::schemes::{self, SignatureScheme};
use crate::types::{param, Brand, MerchantCredentials, SignedUrl, UrlKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a gateway client.
///
/// Every field has a default, so a configuration file only needs to name what
/// differs:
///
/// ```
/// use flexpay::client::ClientConfig;
/// use flexpay::types::Brand;
///
/// let config = ClientConfig::default().with_brand(Brand::CardBilling);
/// assert_eq!(config.base_url(), "https://secure.billing.creditcard");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Brand whose hosts serve the payment pages (default Verotel)
    pub brand: Brand,

    /// Overrides the brand's base URL, e.g. for a staging gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Parameter names and signing rules
    pub contract: GatewayContract,
}

impl ClientConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the brand.
    pub fn with_brand(mut self, brand: Brand) -> Self {
        self.brand = brand;
        self
    }

    /// Points the client at a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the gateway contract.
    pub fn with_contract(mut self, contract: GatewayContract) -> Self {
        self.contract = contract;
        self
    }

    /// Effective base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or_else(|| self.brand.base_url())
    }

    /// Full base path of the page serving `kind`.
    pub fn endpoint(&self, kind: UrlKind) -> String {
        format!("{}{}", self.base_url(), kind.path())
    }
}

/// Builds signed URLs for one merchant.
///
/// # Examples
///
/// ```
/// use flexpay::client::GatewayClient;
/// use flexpay::request::PurchaseRequest;
/// use flexpay::types::{Currency, MerchantCredentials};
/// use rust_decimal::Decimal;
///
/// let client = GatewayClient::with_defaults(MerchantCredentials::new("7", "xxx").unwrap());
///
/// let request = PurchaseRequest::builder()
///     .amount(Decimal::new(1000, 2), Currency::Aud)
///     .reference("Foo")
///     .build()
///     .unwrap();
///
/// let url = client.purchase_url(&request).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://secure.verotel.com/startorder?MerchantId=7&Amount=10.00&Currency=AUD&Reference=Foo\
///      &Signature=E558B3C2DA9DD66A1AC56754D75636ED61D1C40EFB76D6F982198AA90A8FD4FC"
/// );
/// ```
#[derive(Clone)]
pub struct GatewayClient {
    credentials: MerchantCredentials,
    config: ClientConfig,
    scheme: Arc<dyn SignatureScheme>,
}

impl GatewayClient {
    /// Creates a client, checking that the configured base URL is usable.
    pub fn new(credentials: MerchantCredentials, config: ClientConfig) -> Result<Self> {
        if let Some(base_url) = &config.base_url {
            url::Url::parse(base_url).map_err(|e| GatewayError::AssemblyFailure {
                field: "base_url".to_string(),
                reason: e.to_string(),
            })?;
        }

        let scheme = schemes::scheme_for(config.contract.algorithm);
        tracing::debug!(
            merchant_id = credentials.merchant_id(),
            brand = %config.brand,
            base_url = config.base_url(),
            scheme = scheme.name(),
            "created gateway client"
        );

        Ok(Self {
            credentials,
            config,
            scheme,
        })
    }

    /// Creates a client for the default brand and contract.
    pub fn with_defaults(credentials: MerchantCredentials) -> Self {
        let scheme = schemes::scheme_for(GatewayContract::default().algorithm);
        Self {
            credentials,
            config: ClientConfig::default(),
            scheme,
        }
    }

    /// Replaces the signature scheme, e.g. with a gateway-specific primitive.
    pub fn with_scheme(mut self, scheme: Arc<dyn SignatureScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    /// The merchant id URLs are issued for.
    pub fn merchant_id(&self) -> &str {
        self.credentials.merchant_id()
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of the order page for a one-off purchase.
    pub fn purchase_url(&self, request: &PurchaseRequest) -> Result<SignedUrl> {
        let params = params::build(self.merchant_id(), request, &self.config.contract)?;
        self.signed_url(UrlKind::Purchase, &params)
    }

    /// URL of the order page for a new subscription, or an upgrade when the
    /// request names a preceding sale.
    pub fn subscription_url(&self, request: &SubscriptionRequest) -> Result<SignedUrl> {
        let params =
            params::build_subscription(self.merchant_id(), request, &self.config.contract)?;
        let kind = match request.upgrade() {
            Some(_) => UrlKind::UpgradeSubscription,
            None => UrlKind::Subscription,
        };
        self.signed_url(kind, &params)
    }

    /// URL returning machine-readable status of a sale, looked up by sale id.
    pub fn status_url_by_sale(&self, sale_id: &str) -> Result<SignedUrl> {
        let params = params::build_lookup(
            self.merchant_id(),
            param::SALE_ID,
            sale_id,
            &self.config.contract,
        )?;
        self.signed_url(UrlKind::Status, &params)
    }

    /// URL returning machine-readable status of a sale, looked up by the
    /// merchant's reference id.
    pub fn status_url_by_reference(&self, reference_id: &str) -> Result<SignedUrl> {
        let params = params::build_lookup(
            self.merchant_id(),
            param::REFERENCE_ID,
            reference_id,
            &self.config.contract,
        )?;
        self.signed_url(UrlKind::Status, &params)
    }

    /// URL of the page where a subscriber cancels a subscription.
    pub fn cancel_subscription_url(&self, sale_id: &str) -> Result<SignedUrl> {
        let params = params::build_lookup(
            self.merchant_id(),
            param::SALE_ID,
            sale_id,
            &self.config.contract,
        )?;
        self.signed_url(UrlKind::CancelSubscription, &params)
    }

    /// Signature over already-built parameters.
    pub fn signature(&self, params: &Parameters) -> Result<String> {
        schemes::sign(
            params,
            self.credentials.shared_secret(),
            self.scheme.as_ref(),
            &self.config.contract,
        )
    }

    fn signed_url(&self, kind: UrlKind, params: &Parameters) -> Result<SignedUrl> {
        let signature = self.signature(params)?;
        let url = assemble(&self.config.endpoint(kind), params, &signature, &self.config.contract)?;

        tracing::debug!(
            merchant_id = self.merchant_id(),
            kind = %kind,
            parameters = params.len(),
            "assembled signed url"
        );
        Ok(url)
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("scheme", &self.scheme.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::SignatureAlgorithm;
    use crate::types::{Currency, SubscriptionType};
    use rust_decimal_macros::dec;

    fn client() -> GatewayClient {
        GatewayClient::with_defaults(MerchantCredentials::new("7", "xxx").unwrap())
    }

    fn request() -> PurchaseRequest {
        PurchaseRequest::builder()
            .amount(dec!(10.00), Currency::Aud)
            .reference("Foo")
            .build()
            .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.brand, Brand::Verotel);
        assert_eq!(config.base_url(), "https://secure.verotel.com");
        assert_eq!(config.endpoint(UrlKind::Status), "https://secure.verotel.com/salestatus");
    }

    #[test]
    fn test_config_base_url_override() {
        let config = ClientConfig::new().with_base_url("http://localhost:8080/");
        assert_eq!(config.endpoint(UrlKind::Purchase), "http://localhost:8080/startorder");
    }

    #[test]
    fn test_config_deserialization() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"brand": "bitsafepay", "contract": {"algorithm": "hmac-sha3-256"}}"#,
        )
        .unwrap();
        assert_eq!(config.brand, Brand::BitsafePay);
        assert_eq!(config.base_url, None);
        assert_eq!(config.contract.algorithm, SignatureAlgorithm::HmacSha3_256);
        assert_eq!(config.contract.separator, "|");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let credentials = MerchantCredentials::new("7", "xxx").unwrap();
        let err = GatewayClient::new(credentials, ClientConfig::new().with_base_url("not a url"))
            .unwrap_err();
        assert_eq!(err.field(), Some("base_url"));
    }

    #[test]
    fn test_new_uses_configured_algorithm() {
        let credentials = MerchantCredentials::new("7", "xxx").unwrap();
        let contract = GatewayContract::default().with_algorithm(SignatureAlgorithm::HmacSha3_256);
        let config = ClientConfig::new().with_contract(contract);
        let client = GatewayClient::new(credentials, config).unwrap();

        let url = client.purchase_url(&request()).unwrap();
        assert!(url
            .as_str()
            .ends_with("Signature=490EF7C30CF6C609DB0662C713DF02781669B7667C61BFD5903E90F5B40ED491"));
    }

    #[test]
    fn test_purchase_url_scenario() {
        let url = client().purchase_url(&request()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://secure.verotel.com/startorder?MerchantId=7&Amount=10.00&Currency=AUD\
             &Reference=Foo&Signature=E558B3C2DA9DD66A1AC56754D75636ED61D1C40EFB76D6F982198AA90A8FD4FC"
        );
    }

    #[test]
    fn test_subscription_url_endpoint() {
        let request = SubscriptionRequest::new(request(), SubscriptionType::Recurring, "P1M");
        let url = client().subscription_url(&request).unwrap();
        assert!(url.as_str().starts_with("https://secure.verotel.com/startorder?"));
        assert!(url.as_str().contains("&type=subscription&"));

        let upgrade = request.upgrading("433456", None);
        let url = client().subscription_url(&upgrade).unwrap();
        assert!(url.as_str().contains("&type=upgradesubscription&"));
        assert!(!url.as_str().contains("upgradeOption"));
    }

    #[test]
    fn test_lookup_urls() {
        let client = client();

        let url = client.status_url_by_sale("433456").unwrap();
        assert!(url
            .as_str()
            .starts_with("https://secure.verotel.com/salestatus?MerchantId=7&saleID=433456&Signature="));

        let url = client.status_url_by_reference("reference1234").unwrap();
        assert!(url.as_str().contains("&referenceID=reference1234&"));

        let url = client.cancel_subscription_url("433456").unwrap();
        assert!(url
            .as_str()
            .starts_with("https://secure.verotel.com/cancel-subscription?MerchantId=7&saleID=433456"));

        assert!(client.cancel_subscription_url("").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("hmac-sha256"));
        assert!(!debug.contains("xxx"));
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GatewayClient>();
    }
}
