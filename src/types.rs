//! Core type definitions shared by the signing pipeline.
//!
//! Everything the gateway accepts from a closed set (currencies, brands,
//! payment methods, subscription kinds) is an enum here, so that unknown
//! values are rejected when they are parsed and never reach the signer.

use crate::contract::DEFAULT_CURRENCY_PARAM;
use crate::errors::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gateway parameter names that are not part of the configurable contract.
pub mod param {
    /// Payment method restriction (`CC`, `DDEU`)
    pub const PAYMENT_METHOD: &str = "paymentMethod";
    /// Merchant's own unique reference identifier
    pub const REFERENCE_ID: &str = "referenceID";
    /// First pass-through variable
    pub const CUSTOM1: &str = "custom1";
    /// Second pass-through variable
    pub const CUSTOM2: &str = "custom2";
    /// Third pass-through variable
    pub const CUSTOM3: &str = "custom3";
    /// Redirect target after a successful transaction
    pub const SUCCESS_URL: &str = "successURL";
    /// Redirect target after a declined transaction
    pub const DECLINE_URL: &str = "declineURL";
    /// Buyer's email, not signed
    pub const EMAIL: &str = "email";
    /// One-click token from a previous purchase, not signed
    pub const ONE_CLICK_TOKEN: &str = "oneClickToken";
    /// Kind of order page (`subscription`, `upgradesubscription`)
    pub const TYPE: &str = "type";
    /// `one-time` or `recurring`
    pub const SUBSCRIPTION_TYPE: &str = "subscriptionType";
    /// ISO-8601 subscription period
    pub const PERIOD: &str = "period";
    /// Amount charged for the trial period
    pub const TRIAL_AMOUNT: &str = "trialAmount";
    /// ISO-8601 trial period
    pub const TRIAL_PERIOD: &str = "trialPeriod";
    /// Sale the buyer is upgrading from
    pub const PRECEDING_SALE_ID: &str = "precedingSaleID";
    /// What happens to the remainder of the preceding sale
    pub const UPGRADE_OPTION: &str = "upgradeOption";
    /// Gateway sale identifier
    pub const SALE_ID: &str = "saleID";
}

/// Currencies the gateway can charge in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar
    Usd,
    /// Euro
    Eur,
    /// Pound sterling
    Gbp,
    /// Australian dollar
    Aud,
    /// Canadian dollar
    Cad,
    /// Swiss franc
    Chf,
    /// Danish krone
    Dkk,
    /// Norwegian krone
    Nok,
    /// Swedish krona
    Sek,
}

impl Currency {
    /// All supported currencies.
    pub const ALL: [Currency; 9] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Aud,
        Currency::Cad,
        Currency::Chf,
        Currency::Dkk,
        Currency::Nok,
        Currency::Sek,
    ];

    /// Returns the three-letter ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Chf => "CHF",
            Currency::Dkk => "DKK",
            Currency::Nok => "NOK",
            Currency::Sek => "SEK",
        }
    }

    /// Number of fractional digits in the currency's minor unit.
    ///
    /// Every currency the gateway sells in is subdivided into hundredths.
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::Usd
            | Currency::Eur
            | Currency::Gbp
            | Currency::Aud
            | Currency::Cad
            | Currency::Chf
            | Currency::Dkk
            | Currency::Nok
            | Currency::Sek => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = GatewayError;

    /// Parses an ISO 4217 code, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexpay::types::Currency;
    ///
    /// assert_eq!("aud".parse::<Currency>().unwrap(), Currency::Aud);
    /// assert!("XYZ".parse::<Currency>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GatewayError::UnsupportedCurrency {
                field: DEFAULT_CURRENCY_PARAM.to_string(),
                code: s.to_string(),
            })
    }
}

/// Payment brands operated on the same gateway software.
///
/// The brand only decides which host the URL points at.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    /// secure.verotel.com
    #[default]
    Verotel,
    /// secure.bitsafepay.com
    BitsafePay,
    /// secure.billing.creditcard
    CardBilling,
    /// secure.gaycharge.com
    GayCharge,
    /// secure.paintfestpayments.com
    PaintFest,
    /// secure.bill.creditcard
    Bill,
}

impl Brand {
    const ALL: [Brand; 6] = [
        Brand::Verotel,
        Brand::BitsafePay,
        Brand::CardBilling,
        Brand::GayCharge,
        Brand::PaintFest,
        Brand::Bill,
    ];

    /// Base URL of the brand's hosted pages, without a trailing slash.
    pub fn base_url(&self) -> &'static str {
        match self {
            Brand::Verotel => "https://secure.verotel.com",
            Brand::BitsafePay => "https://secure.bitsafepay.com",
            Brand::CardBilling => "https://secure.billing.creditcard",
            Brand::GayCharge => "https://secure.gaycharge.com",
            Brand::PaintFest => "https://secure.paintfestpayments.com",
            Brand::Bill => "https://secure.bill.creditcard",
        }
    }

    /// Lowercase brand name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Brand::Verotel => "verotel",
            Brand::BitsafePay => "bitsafepay",
            Brand::CardBilling => "cardbilling",
            Brand::GayCharge => "gaycharge",
            Brand::PaintFest => "paintfest",
            Brand::Bill => "bill",
        }
    }

    fn customer_prefix(&self) -> &'static str {
        match self {
            Brand::Verotel => "9804",
            Brand::CardBilling => "9762",
            Brand::BitsafePay => "9653",
            Brand::Bill => "9511",
            Brand::PaintFest => "9444",
            Brand::GayCharge => "9388",
        }
    }

    /// Derives the brand from a customer (merchant account) id.
    ///
    /// The first four digits of the id identify the brand.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexpay::types::Brand;
    ///
    /// assert_eq!(Brand::from_merchant_id("9762000000000000").unwrap(), Brand::CardBilling);
    /// assert!(Brand::from_merchant_id("1234").is_err());
    /// ```
    pub fn from_merchant_id(merchant_id: &str) -> Result<Self> {
        let prefix = merchant_id.get(..4).unwrap_or(merchant_id);
        Brand::ALL
            .into_iter()
            .find(|b| b.customer_prefix() == prefix)
            .ok_or_else(|| {
                GatewayError::invalid_parameter("merchant_id", "unknown customer id prefix")
            })
    }

    /// Looks a brand up by name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        Brand::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                GatewayError::invalid_parameter("brand", format!("unknown brand '{}'", name))
            })
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Restricts the order page to a single payment method.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Credit card
    #[serde(rename = "CC")]
    CreditCard,
    /// SEPA direct debit (DE, AT, CH, BE, IT, NL, ES, FR; EUR only)
    #[serde(rename = "DDEU")]
    DirectDebit,
}

impl PaymentMethod {
    /// Every method the gateway accepts.
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::CreditCard, PaymentMethod::DirectDebit];

    /// Gateway spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CC",
            PaymentMethod::DirectDebit => "DDEU",
        }
    }
}

/// Whether a subscription renews automatically.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionType {
    /// Single period, no renewal
    OneTime,
    /// Renewed at the end of every period
    Recurring,
}

impl SubscriptionType {
    /// Gateway spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::OneTime => "one-time",
            SubscriptionType::Recurring => "recurring",
        }
    }
}

/// How to deal with the remaining period of the sale being upgraded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeOption {
    /// Remaining period is lost
    Lost,
    /// Remaining period is added to the new sale
    Extend,
}

impl UpgradeOption {
    /// Gateway spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeOption::Lost => "lost",
            UpgradeOption::Extend => "extend",
        }
    }
}

/// Hosted page a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// One-off purchase order page
    Purchase,
    /// New subscription order page
    Subscription,
    /// Upgrade of an existing subscription
    UpgradeSubscription,
    /// Machine-readable sale status
    Status,
    /// Subscription cancellation page
    CancelSubscription,
}

impl UrlKind {
    /// Path below the brand's base URL.
    pub fn path(&self) -> &'static str {
        match self {
            UrlKind::Purchase | UrlKind::Subscription | UrlKind::UpgradeSubscription => {
                "/startorder"
            }
            UrlKind::Status => "/salestatus",
            UrlKind::CancelSubscription => "/cancel-subscription",
        }
    }

    /// Value of the `type` parameter, for the pages that need one.
    pub fn type_param(&self) -> Option<&'static str> {
        match self {
            UrlKind::Subscription => Some("subscription"),
            UrlKind::UpgradeSubscription => Some("upgradesubscription"),
            UrlKind::Purchase | UrlKind::Status | UrlKind::CancelSubscription => None,
        }
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlKind::Purchase => "purchase",
            UrlKind::Subscription => "subscription",
            UrlKind::UpgradeSubscription => "upgradesubscription",
            UrlKind::Status => "status",
            UrlKind::CancelSubscription => "cancel-subscription",
        };
        f.write_str(name)
    }
}

/// Merchant identity and the secret shared with the gateway.
///
/// Immutable once built. The secret never shows up in `Debug` output and the
/// type is deliberately not serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct MerchantCredentials {
    merchant_id: String,
    shared_secret: String,
}

impl MerchantCredentials {
    /// Creates credentials, rejecting empty values.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexpay::types::MerchantCredentials;
    ///
    /// let credentials = MerchantCredentials::new("7", "xxx").unwrap();
    /// assert_eq!(credentials.merchant_id(), "7");
    /// assert!(MerchantCredentials::new("7", "").is_err());
    /// ```
    pub fn new(merchant_id: impl Into<String>, shared_secret: impl Into<String>) -> Result<Self> {
        let merchant_id = merchant_id.into();
        let shared_secret = shared_secret.into();

        if merchant_id.trim().is_empty() {
            return Err(GatewayError::InvalidCredentials {
                field: "merchant_id".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if shared_secret.is_empty() {
            return Err(GatewayError::InvalidCredentials {
                field: "shared_secret".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            merchant_id,
            shared_secret,
        })
    }

    /// Merchant (website/shop) id.
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub(crate) fn shared_secret(&self) -> &str {
        &self.shared_secret
    }
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

/// A fully assembled, signed gateway URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedUrl {
    value: String,
}

impl SignedUrl {
    pub(crate) fn new(value: String) -> Self {
        Self { value }
    }

    /// The URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consumes the wrapper, returning the URL string.
    pub fn into_string(self) -> String {
        self.value
    }

    /// Parses the value into a [`url::Url`].
    pub fn to_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.value).map_err(|e| GatewayError::AssemblyFailure {
            field: "url".to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!(" sek ".parse::<Currency>().unwrap(), Currency::Sek);

        let err = "JPY".parse::<Currency>().unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedCurrency { ref code, .. } if code == "JPY"));
    }

    #[test]
    fn test_currency_codes_roundtrip() {
        for currency in Currency::ALL {
            assert_eq!(currency.code().parse::<Currency>().unwrap(), currency);
            assert_eq!(currency.minor_units(), 2);
        }
    }

    #[test]
    fn test_currency_serialization() {
        let json = serde_json::to_string(&Currency::Aud).unwrap();
        assert_eq!(json, "\"AUD\"");
    }

    #[test]
    fn test_brand_from_merchant_id() {
        assert_eq!(Brand::from_merchant_id("9804000000000000").unwrap(), Brand::Verotel);
        assert_eq!(Brand::from_merchant_id("9653000000000000").unwrap(), Brand::BitsafePay);
        assert_eq!(Brand::from_merchant_id("9388123").unwrap(), Brand::GayCharge);
        assert!(Brand::from_merchant_id("98").is_err());
        assert!(Brand::from_merchant_id("1111000000000000").is_err());
    }

    #[test]
    fn test_brand_from_name() {
        assert_eq!(Brand::from_name("CardBilling").unwrap(), Brand::CardBilling);
        assert_eq!(Brand::from_name("bill").unwrap(), Brand::Bill);
        assert!(Brand::from_name("paypal").is_err());
    }

    #[test]
    fn test_url_kind_paths() {
        assert_eq!(UrlKind::Purchase.path(), "/startorder");
        assert_eq!(UrlKind::Status.path(), "/salestatus");
        assert_eq!(UrlKind::CancelSubscription.path(), "/cancel-subscription");
        assert_eq!(UrlKind::Purchase.type_param(), None);
        assert_eq!(UrlKind::UpgradeSubscription.type_param(), Some("upgradesubscription"));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = MerchantCredentials::new("7", "super-secret").unwrap();
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("\"7\""));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_credentials_validation() {
        let err = MerchantCredentials::new("  ", "xxx").unwrap_err();
        assert_eq!(err.field(), Some("merchant_id"));

        let err = MerchantCredentials::new("7", "").unwrap_err();
        assert_eq!(err.field(), Some("shared_secret"));
        assert!(!err.to_string().contains("xxx"));
    }

    #[test]
    fn test_signed_url_accessors() {
        let url = SignedUrl::new("https://secure.verotel.com/startorder?a=1".to_string());
        assert_eq!(url.to_string(), url.as_str());
        assert_eq!(url.to_url().unwrap().path(), "/startorder");
    }
}
