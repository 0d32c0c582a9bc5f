//! Request value objects and their builders.
//!
//! Builders accumulate fields and hand out an immutable request; nothing on a
//! finished request can be changed afterwards, so the same request always
//! signs to the same URL.

use crate::contract::{DEFAULT_AMOUNT_PARAM, DEFAULT_CURRENCY_PARAM, DEFAULT_REFERENCE_PARAM};
use crate::errors::{GatewayError, Result};
use crate::types::{param, Currency, PaymentMethod, SubscriptionType, UpgradeOption};
use rust_decimal::Decimal;

/// A one-off purchase the payer is asked to pay for.
///
/// # Examples
///
/// ```
/// use flexpay::request::PurchaseRequest;
/// use flexpay::types::Currency;
/// use rust_decimal::Decimal;
///
/// let request = PurchaseRequest::builder()
///     .amount(Decimal::new(1000, 2), Currency::Aud)
///     .reference("Foo")
///     .custom1("order-42")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.currency(), Currency::Aud);
/// assert_eq!(request.extra_fields()[0], ("custom1".to_string(), "order-42".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    amount: Decimal,
    currency: Currency,
    reference: String,
    payment_method: Option<PaymentMethod>,
    extra_fields: Vec<(String, String)>,
    unsigned_fields: Vec<(String, String)>,
}

impl PurchaseRequest {
    /// Starts an empty builder.
    pub fn builder() -> PurchaseRequestBuilder {
        PurchaseRequestBuilder::default()
    }

    /// Amount to charge.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Currency of the amount.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Description shown on the order page.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Payment method restriction, if any.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Signed extension fields, in the order they were added.
    pub fn extra_fields(&self) -> &[(String, String)] {
        &self.extra_fields
    }

    /// Fields sent along but left out of the signature.
    pub fn unsigned_fields(&self) -> &[(String, String)] {
        &self.unsigned_fields
    }
}

/// Builder for [`PurchaseRequest`].
///
/// Typed helpers such as [`custom1`](Self::custom1) append extra fields under
/// the gateway's parameter names, in call order.
#[derive(Debug, Clone, Default)]
pub struct PurchaseRequestBuilder {
    amount: Option<Decimal>,
    currency: Option<Currency>,
    reference: Option<String>,
    payment_method: Option<PaymentMethod>,
    extra_fields: Vec<(String, String)>,
    unsigned_fields: Vec<(String, String)>,
}

impl PurchaseRequestBuilder {
    /// Sets the amount and its currency.
    pub fn amount(mut self, amount: Decimal, currency: Currency) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency);
        self
    }

    /// Sets the currency from an ISO 4217 code.
    ///
    /// Fails with [`GatewayError::UnsupportedCurrency`] for codes the gateway
    /// does not sell in.
    pub fn currency_code(mut self, code: &str) -> Result<Self> {
        self.currency = Some(code.parse()?);
        Ok(self)
    }

    /// Sets the amount from a decimal string such as `"25.99"`.
    pub fn amount_str(mut self, amount: &str) -> Result<Self> {
        self.amount = Some(crate::utils::parse_amount(amount)?);
        Ok(self)
    }

    /// Sets the description shown on the order page (max 100 characters).
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Appends a signed gateway-specific field.
    pub fn extra_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_fields.push((key.into(), value.into()));
        self
    }

    /// Appends a field that is sent but not signed.
    pub fn unsigned_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.unsigned_fields.push((key.into(), value.into()));
        self
    }

    /// Restricts the order page to one payment method.
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self.extra_field(param::PAYMENT_METHOD, method.as_str())
    }

    /// Merchant's own reference for the sale. Must be unique on the gateway.
    pub fn reference_id(self, reference_id: impl Into<String>) -> Self {
        self.extra_field(param::REFERENCE_ID, reference_id)
    }

    /// Pass-through variable 1 (max 255 characters).
    pub fn custom1(self, value: impl Into<String>) -> Self {
        self.extra_field(param::CUSTOM1, value)
    }

    /// Pass-through variable 2 (max 255 characters).
    pub fn custom2(self, value: impl Into<String>) -> Self {
        self.extra_field(param::CUSTOM2, value)
    }

    /// Pass-through variable 3 (max 255 characters).
    pub fn custom3(self, value: impl Into<String>) -> Self {
        self.extra_field(param::CUSTOM3, value)
    }

    /// Where the buyer lands after a successful payment (max 255 characters).
    pub fn success_url(self, url: impl Into<String>) -> Self {
        self.extra_field(param::SUCCESS_URL, url)
    }

    /// Where the buyer lands after a declined payment (max 255 characters).
    pub fn decline_url(self, url: impl Into<String>) -> Self {
        self.extra_field(param::DECLINE_URL, url)
    }

    /// Pre-fills the buyer's email (max 100 characters, not signed).
    pub fn email(self, email: impl Into<String>) -> Self {
        self.unsigned_field(param::EMAIL, email)
    }

    /// Token from a previous purchase for one-click payment (not signed).
    ///
    /// Only valid together with [`PaymentMethod::CreditCard`].
    pub fn one_click_token(self, token: impl Into<String>) -> Self {
        self.unsigned_field(param::ONE_CLICK_TOKEN, token)
    }

    /// Finishes the request.
    ///
    /// Only presence is checked here; values are validated when the request
    /// is turned into parameters.
    pub fn build(self) -> Result<PurchaseRequest> {
        Ok(PurchaseRequest {
            amount: self
                .amount
                .ok_or_else(|| GatewayError::MissingField(DEFAULT_AMOUNT_PARAM.to_string()))?,
            currency: self
                .currency
                .ok_or_else(|| GatewayError::MissingField(DEFAULT_CURRENCY_PARAM.to_string()))?,
            reference: self
                .reference
                .ok_or_else(|| GatewayError::MissingField(DEFAULT_REFERENCE_PARAM.to_string()))?,
            payment_method: self.payment_method,
            extra_fields: self.extra_fields,
            unsigned_fields: self.unsigned_fields,
        })
    }
}

/// Trial terms at the start of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    /// Amount charged for the trial, in the subscription's currency
    pub amount: Decimal,
    /// ISO-8601 trial length, e.g. `P3D`
    pub period: String,
}

/// Subscription being replaced by an upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    /// Gateway sale id of the subscription being upgraded
    pub preceding_sale_id: String,
    /// What happens to the rest of its period
    pub option: Option<UpgradeOption>,
}

/// A subscription (or subscription upgrade) the payer is asked to start.
///
/// # Examples
///
/// ```
/// use flexpay::request::{PurchaseRequest, SubscriptionRequest};
/// use flexpay::types::{Currency, SubscriptionType};
/// use rust_decimal::Decimal;
///
/// let purchase = PurchaseRequest::builder()
///     .amount(Decimal::new(999, 2), Currency::Usd)
///     .reference("Monthly membership")
///     .build()
///     .unwrap();
///
/// let subscription = SubscriptionRequest::new(purchase, SubscriptionType::Recurring, "P1M")
///     .with_trial(Decimal::new(1, 2), "P3D");
///
/// assert_eq!(subscription.period(), "P1M");
/// assert!(subscription.trial().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    purchase: PurchaseRequest,
    subscription_type: SubscriptionType,
    period: String,
    trial: Option<Trial>,
    upgrade: Option<Upgrade>,
}

impl SubscriptionRequest {
    /// Creates a subscription charging `purchase`'s amount every `period`.
    pub fn new(
        purchase: PurchaseRequest,
        subscription_type: SubscriptionType,
        period: impl Into<String>,
    ) -> Self {
        Self {
            purchase,
            subscription_type,
            period: period.into(),
            trial: None,
            upgrade: None,
        }
    }

    /// Adds a trial period charged at `amount`.
    pub fn with_trial(mut self, amount: Decimal, period: impl Into<String>) -> Self {
        self.trial = Some(Trial {
            amount,
            period: period.into(),
        });
        self
    }

    /// Turns the request into an upgrade of an existing sale.
    pub fn upgrading(
        mut self,
        preceding_sale_id: impl Into<String>,
        option: Option<UpgradeOption>,
    ) -> Self {
        self.upgrade = Some(Upgrade {
            preceding_sale_id: preceding_sale_id.into(),
            option,
        });
        self
    }

    /// The underlying price, reference and extra fields.
    pub fn purchase(&self) -> &PurchaseRequest {
        &self.purchase
    }

    /// One-time or recurring.
    pub fn subscription_type(&self) -> SubscriptionType {
        self.subscription_type
    }

    /// ISO-8601 billing period.
    pub fn period(&self) -> &str {
        &self.period
    }

    /// Trial terms, if any.
    pub fn trial(&self) -> Option<&Trial> {
        self.trial.as_ref()
    }

    /// Upgrade terms, if this replaces an existing subscription.
    pub fn upgrade(&self) -> Option<&Upgrade> {
        self.upgrade.as_ref()
    }
}
