//! Parameter builder: turns requests into the canonical, ordered list of
//! query parameters.
//!
//! The order produced here is the order values are signed in. Reordering
//! anything in this module changes every signature and breaks existing
//! integrations.

use crate::contract::GatewayContract;
use crate::errors::{GatewayError, Result};
use crate::request::{PurchaseRequest, SubscriptionRequest};
use crate::types::{param, Currency, PaymentMethod, SubscriptionType, UrlKind};
use crate::utils::{format_amount, validate_period};
use std::collections::HashSet;

/// Maximum length of the order page description.
pub const MAX_REFERENCE_LEN: usize = 100;

/// Maximum length of the pass-through variables and redirect URLs.
pub const MAX_EXTRA_FIELD_LEN: usize = 255;

/// Maximum length of the buyer's email.
pub const MAX_EMAIL_LEN: usize = 100;

/// One query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name
    pub key: String,
    /// Unencoded value
    pub value: String,
    /// Whether the value takes part in the signature
    pub signed: bool,
}

/// Ordered query parameters, not yet encoded or signed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<Parameter>,
}

impl Parameters {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a signed parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Parameter {
            key: key.into(),
            value: value.into(),
            signed: true,
        });
    }

    /// Appends a parameter that is left out of the signature.
    pub fn push_unsigned(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Parameter {
            key: key.into(),
            value: value.into(),
            signed: false,
        });
    }

    /// Iterates in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.iter()
    }

    /// Values that take part in the signature, in canonical order.
    pub fn signed_values(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|p| p.signed)
            .map(|p| p.value.as_str())
    }

    /// Value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds the canonical parameters for a one-off purchase.
///
/// Order: merchant id, amount, currency, reference, extra fields as supplied,
/// then unsigned fields.
///
/// # Examples
///
/// ```
/// use flexpay::contract::GatewayContract;
/// use flexpay::params::build;
/// use flexpay::request::PurchaseRequest;
/// use flexpay::types::Currency;
/// use rust_decimal::Decimal;
///
/// let request = PurchaseRequest::builder()
///     .amount(Decimal::new(10, 0), Currency::Aud)
///     .reference("Foo")
///     .build()
///     .unwrap();
///
/// let params = build("7", &request, &GatewayContract::default()).unwrap();
/// let values: Vec<&str> = params.signed_values().collect();
/// assert_eq!(values, ["7", "10.00", "AUD", "Foo"]);
/// ```
pub fn build(
    merchant_id: &str,
    request: &PurchaseRequest,
    contract: &GatewayContract,
) -> Result<Parameters> {
    let mut params = core_parameters(merchant_id, request, contract)?;
    append_fields(&mut params, request, contract)?;
    Ok(params)
}

/// Builds the canonical parameters for a subscription or an upgrade.
///
/// The subscription terms come right after the reference and before the
/// caller's extra fields.
pub fn build_subscription(
    merchant_id: &str,
    request: &SubscriptionRequest,
    contract: &GatewayContract,
) -> Result<Parameters> {
    let purchase = request.purchase();
    let mut params = core_parameters(merchant_id, purchase, contract)?;
    let method = validate_payment_method(purchase)?;

    let kind = match request.upgrade() {
        Some(_) => UrlKind::UpgradeSubscription,
        None => UrlKind::Subscription,
    };
    if let Some(type_param) = kind.type_param() {
        params.push(param::TYPE, type_param);
    }

    if method == Some(PaymentMethod::DirectDebit)
        && request.subscription_type() != SubscriptionType::OneTime
    {
        return Err(GatewayError::invalid_parameter(
            param::SUBSCRIPTION_TYPE,
            "DDEU only supports one-time subscriptions",
        ));
    }
    params.push(param::SUBSCRIPTION_TYPE, request.subscription_type().as_str());

    validate_period(param::PERIOD, request.period())?;
    params.push(param::PERIOD, request.period());

    if let Some(trial) = request.trial() {
        let amount = format_amount(param::TRIAL_AMOUNT, trial.amount, purchase.currency())?;
        validate_period(param::TRIAL_PERIOD, &trial.period)?;
        params.push(param::TRIAL_AMOUNT, amount);
        params.push(param::TRIAL_PERIOD, trial.period.as_str());
    }

    if let Some(upgrade) = request.upgrade() {
        let has_reference_id = purchase
            .extra_fields()
            .iter()
            .chain(purchase.unsigned_fields())
            .any(|(key, value)| key == param::REFERENCE_ID && !value.is_empty());
        if has_reference_id {
            return Err(GatewayError::invalid_parameter(
                param::REFERENCE_ID,
                "upgrades keep the reference id of the preceding sale",
            ));
        }
        require_id(param::PRECEDING_SALE_ID, &upgrade.preceding_sale_id)?;
        params.push(param::PRECEDING_SALE_ID, upgrade.preceding_sale_id.as_str());
        if let Some(option) = upgrade.option {
            params.push(param::UPGRADE_OPTION, option.as_str());
        }
    }

    append_fields(&mut params, purchase, contract)?;
    Ok(params)
}

/// Builds the parameters of a status or cancellation lookup:
/// merchant id followed by `key=id`.
pub fn build_lookup(
    merchant_id: &str,
    key: &str,
    id: &str,
    contract: &GatewayContract,
) -> Result<Parameters> {
    require_id(key, id)?;

    let mut params = Parameters::new();
    params.push(contract.merchant_id_param.as_str(), merchant_id);
    params.push(key, id);
    Ok(params)
}

fn core_parameters(
    merchant_id: &str,
    request: &PurchaseRequest,
    contract: &GatewayContract,
) -> Result<Parameters> {
    let amount = format_amount(&contract.amount_param, request.amount(), request.currency())?;
    validate_reference(&contract.reference_param, request.reference())?;
    validate_payment_method(request)?;

    let mut params = Parameters::new();
    params.push(contract.merchant_id_param.as_str(), merchant_id);
    params.push(contract.amount_param.as_str(), amount);
    params.push(contract.currency_param.as_str(), request.currency().code());
    params.push(contract.reference_param.as_str(), request.reference());
    Ok(params)
}

fn append_fields(
    params: &mut Parameters,
    request: &PurchaseRequest,
    contract: &GatewayContract,
) -> Result<()> {
    let mut seen: HashSet<String> = contract
        .reserved_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    seen.extend(params.iter().map(|p| p.key.clone()));

    for (key, value) in request.extra_fields() {
        validate_field(&mut seen, key, value)?;
        if !value.is_empty() {
            params.push(key.as_str(), value.as_str());
        }
    }

    for (key, value) in request.unsigned_fields() {
        validate_field(&mut seen, key, value)?;
        if !value.is_empty() {
            params.push_unsigned(key.as_str(), value.as_str());
        }
    }

    Ok(())
}

fn validate_reference(field: &str, reference: &str) -> Result<()> {
    let reason = if reference.trim().is_empty() {
        "must not be empty".to_string()
    } else if reference.chars().count() > MAX_REFERENCE_LEN {
        format!("must be at most {} characters", MAX_REFERENCE_LEN)
    } else {
        return Ok(());
    };

    Err(GatewayError::InvalidReference {
        field: field.to_string(),
        reason,
    })
}

/// Payment method as it will be sent, whichever builder call set it.
fn payment_method(request: &PurchaseRequest) -> Result<Option<PaymentMethod>> {
    let value = request
        .extra_fields()
        .iter()
        .chain(request.unsigned_fields())
        .find(|(key, value)| key == param::PAYMENT_METHOD && !value.is_empty())
        .map(|(_, value)| value.as_str());

    match value {
        None => Ok(request.payment_method()),
        Some(value) => PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .map(Some)
            .ok_or_else(|| {
                GatewayError::invalid_parameter(
                    param::PAYMENT_METHOD,
                    format!("unknown payment method '{}'", value),
                )
            }),
    }
}

fn validate_payment_method(request: &PurchaseRequest) -> Result<Option<PaymentMethod>> {
    for key in [param::EMAIL, param::ONE_CLICK_TOKEN] {
        if request.extra_fields().iter().any(|(k, _)| k == key) {
            return Err(GatewayError::invalid_parameter(key, "must not be signed"));
        }
    }

    let method = payment_method(request)?;
    let has_token = request
        .unsigned_fields()
        .iter()
        .any(|(key, value)| key == param::ONE_CLICK_TOKEN && !value.is_empty());

    match method {
        Some(PaymentMethod::DirectDebit) if request.currency() != Currency::Eur => {
            Err(GatewayError::invalid_parameter(
                param::PAYMENT_METHOD,
                "DDEU can only be used with EUR",
            ))
        }
        Some(PaymentMethod::DirectDebit) | None if has_token => {
            Err(GatewayError::invalid_parameter(
                param::ONE_CLICK_TOKEN,
                "requires the CC payment method",
            ))
        }
        _ => Ok(method),
    }
}

fn validate_field(seen: &mut HashSet<String>, key: &str, value: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(GatewayError::invalid_parameter(key, "name must not be empty"));
    }
    if !seen.insert(key.to_string()) {
        return Err(GatewayError::invalid_parameter(key, "appears more than once"));
    }

    let limit = match key {
        param::CUSTOM1 | param::CUSTOM2 | param::CUSTOM3 => Some(MAX_EXTRA_FIELD_LEN),
        param::SUCCESS_URL | param::DECLINE_URL => Some(MAX_EXTRA_FIELD_LEN),
        param::EMAIL => Some(MAX_EMAIL_LEN),
        _ => None,
    };
    if let Some(limit) = limit {
        if value.chars().count() > limit {
            return Err(GatewayError::invalid_parameter(
                key,
                format!("must be at most {} characters", limit),
            ));
        }
    }

    Ok(())
}

fn require_id(field: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(GatewayError::invalid_parameter(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpgradeOption;
    use rust_decimal_macros::dec;

    fn purchase() -> crate::request::PurchaseRequestBuilder {
        PurchaseRequest::builder()
            .amount(dec!(10.00), Currency::Aud)
            .reference("Foo")
    }

    fn keys(params: &Parameters) -> Vec<&str> {
        params.iter().map(|p| p.key.as_str()).collect()
    }

    #[test]
    fn test_build_core_order() {
        let request = purchase().build().unwrap();
        let params = build("7", &request, &GatewayContract::default()).unwrap();

        assert_eq!(keys(&params), ["MerchantId", "Amount", "Currency", "Reference"]);
        assert_eq!(params.get("Amount"), Some("10.00"));
        assert!(params.iter().all(|p| p.signed));
    }

    #[test]
    fn test_build_extras_follow_core_in_supplied_order() {
        let request = purchase()
            .extra_field("zeta", "1")
            .extra_field("alpha", "2")
            .email("buyer@example.com")
            .build()
            .unwrap();
        let params = build("7", &request, &GatewayContract::default()).unwrap();

        assert_eq!(
            keys(&params),
            ["MerchantId", "Amount", "Currency", "Reference", "zeta", "alpha", "email"]
        );
        let signed: Vec<&str> = params.signed_values().collect();
        assert_eq!(signed, ["7", "10.00", "AUD", "Foo", "1", "2"]);
    }

    #[test]
    fn test_build_skips_empty_values() {
        let request = purchase().custom1("").custom2("kept").build().unwrap();
        let params = build("7", &request, &GatewayContract::default()).unwrap();

        assert_eq!(params.get("custom1"), None);
        assert_eq!(params.get("custom2"), Some("kept"));
    }

    #[test]
    fn test_build_zero_amount() {
        let request = PurchaseRequest::builder()
            .amount(dec!(0), Currency::Usd)
            .reference("Free sample")
            .build()
            .unwrap();
        let params = build("7", &request, &GatewayContract::default()).unwrap();
        assert_eq!(params.get("Amount"), Some("0.00"));
    }

    #[test]
    fn test_build_rejects_negative_amount() {
        let request = PurchaseRequest::builder()
            .amount(dec!(-0.01), Currency::Aud)
            .reference("Foo")
            .build()
            .unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAmount { ref field, .. } if field == "Amount"));
    }

    #[test]
    fn test_build_rejects_bad_reference() {
        let request = purchase().reference("   ").build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidReference { .. }));

        let request = purchase().reference("x".repeat(101)).build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidReference { .. }));

        let request = purchase().reference("ř".repeat(100)).build().unwrap();
        assert!(build("7", &request, &GatewayContract::default()).is_ok());
    }

    #[test]
    fn test_build_rejects_duplicate_and_reserved_keys() {
        let request = purchase().custom1("a").custom1("b").build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("custom1"));

        let request = purchase().extra_field("Signature", "forged").build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("Signature"));

        let request = purchase().extra_field("", "x").build().unwrap();
        assert!(build("7", &request, &GatewayContract::default()).is_err());
    }

    #[test]
    fn test_build_enforces_field_lengths() {
        let request = purchase().custom3("c".repeat(256)).build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("custom3"));

        let request = purchase()
            .email(format!("{}@example.com", "a".repeat(100)))
            .build()
            .unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_payment_method_rules() {
        let request = purchase()
            .payment_method(PaymentMethod::DirectDebit)
            .build()
            .unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("paymentMethod"));

        let request = purchase().one_click_token("tok").build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("oneClickToken"));

        let request = purchase()
            .payment_method(PaymentMethod::CreditCard)
            .one_click_token("tok")
            .build()
            .unwrap();
        let params = build("7", &request, &GatewayContract::default()).unwrap();
        assert_eq!(params.get("oneClickToken"), Some("tok"));
        assert_eq!(params.signed_values().count(), 5);
    }

    #[test]
    fn test_payment_method_rules_apply_to_raw_fields() {
        let request = PurchaseRequest::builder()
            .amount(dec!(10.00), Currency::Usd)
            .reference("Foo")
            .extra_field("paymentMethod", "DDEU")
            .build()
            .unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("paymentMethod"));

        let request = purchase()
            .unsigned_field("oneClickToken", "tok")
            .build()
            .unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("oneClickToken"));

        let request = purchase()
            .extra_field("paymentMethod", "CC")
            .extra_field("oneClickToken", "tok")
            .build()
            .unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(
            err,
            GatewayError::invalid_parameter("oneClickToken", "must not be signed")
        );

        let request = purchase().extra_field("paymentMethod", "BTC").build().unwrap();
        let err = build("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("paymentMethod"));

        let request = purchase()
            .extra_field("paymentMethod", "CC")
            .one_click_token("tok")
            .build()
            .unwrap();
        let params = build("7", &request, &GatewayContract::default()).unwrap();
        assert_eq!(params.signed_values().count(), 5);
    }

    #[test]
    fn test_build_subscription_checks_raw_payment_method() {
        let request = SubscriptionRequest::new(
            PurchaseRequest::builder()
                .amount(dec!(5), Currency::Eur)
                .reference("Foo")
                .extra_field("paymentMethod", "DDEU")
                .build()
                .unwrap(),
            SubscriptionType::Recurring,
            "P1M",
        );
        let err = build_subscription("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("subscriptionType"));
    }

    #[test]
    fn test_build_subscription_order() {
        let request = SubscriptionRequest::new(
            purchase().custom1("x").build().unwrap(),
            SubscriptionType::Recurring,
            "P1M",
        )
        .with_trial(dec!(0.01), "P3D");

        let params = build_subscription("7", &request, &GatewayContract::default()).unwrap();
        assert_eq!(
            keys(&params),
            [
                "MerchantId",
                "Amount",
                "Currency",
                "Reference",
                "type",
                "subscriptionType",
                "period",
                "trialAmount",
                "trialPeriod",
                "custom1",
            ]
        );
        assert_eq!(params.get("type"), Some("subscription"));
        assert_eq!(params.get("subscriptionType"), Some("recurring"));
        assert_eq!(params.get("trialAmount"), Some("0.01"));
    }

    #[test]
    fn test_build_upgrade() {
        let request = SubscriptionRequest::new(
            purchase().build().unwrap(),
            SubscriptionType::OneTime,
            "P30D",
        )
        .upgrading("433456", Some(UpgradeOption::Lost));

        let params = build_subscription("7", &request, &GatewayContract::default()).unwrap();
        assert_eq!(params.get("type"), Some("upgradesubscription"));
        assert_eq!(params.get("precedingSaleID"), Some("433456"));
        assert_eq!(params.get("upgradeOption"), Some("lost"));
    }

    #[test]
    fn test_build_upgrade_rejects_reference_id() {
        let request = SubscriptionRequest::new(
            purchase().reference_id("order-42").build().unwrap(),
            SubscriptionType::OneTime,
            "P30D",
        )
        .upgrading("433456", None);
        let err = build_subscription("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("referenceID"));

        let plain = SubscriptionRequest::new(
            purchase().reference_id("order-42").build().unwrap(),
            SubscriptionType::OneTime,
            "P30D",
        );
        let params = build_subscription("7", &plain, &GatewayContract::default()).unwrap();
        assert_eq!(params.get("referenceID"), Some("order-42"));
    }

    #[test]
    fn test_build_subscription_validation() {
        let bad_period = SubscriptionRequest::new(
            purchase().build().unwrap(),
            SubscriptionType::Recurring,
            "monthly",
        );
        let err = build_subscription("7", &bad_period, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("period"));

        let bad_trial = SubscriptionRequest::new(
            purchase().build().unwrap(),
            SubscriptionType::Recurring,
            "P1M",
        )
        .with_trial(dec!(-1), "P3D");
        let err = build_subscription("7", &bad_trial, &GatewayContract::default()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAmount { ref field, .. } if field == "trialAmount"));

        let ddeu = PurchaseRequest::builder()
            .amount(dec!(5), Currency::Eur)
            .reference("Foo")
            .payment_method(PaymentMethod::DirectDebit)
            .build()
            .unwrap();
        let recurring = SubscriptionRequest::new(ddeu, SubscriptionType::Recurring, "P1M");
        let err = build_subscription("7", &recurring, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("subscriptionType"));
    }

    #[test]
    fn test_build_subscription_rejects_reused_subscription_key() {
        let request = SubscriptionRequest::new(
            purchase().extra_field("period", "P2M").build().unwrap(),
            SubscriptionType::Recurring,
            "P1M",
        );
        let err = build_subscription("7", &request, &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("period"));
    }

    #[test]
    fn test_build_lookup() {
        let params = build_lookup("7", "saleID", "433456", &GatewayContract::default()).unwrap();
        assert_eq!(keys(&params), ["MerchantId", "saleID"]);

        let err = build_lookup("7", "saleID", " ", &GatewayContract::default()).unwrap_err();
        assert_eq!(err.field(), Some("saleID"));
    }
}
