//! Utility functions for amounts and URL encoding.
//!
//! This module provides the locale-independent amount formatting and the
//! query-component encoding used throughout the library.

use crate::contract::{SpaceEncoding, DEFAULT_AMOUNT_PARAM};
use crate::errors::{GatewayError, Result};
use crate::types::Currency;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use url::form_urlencoded;

/// Parses a plain decimal string such as `"10.00"` into a [`Decimal`].
///
/// Exponent notation, thousands separators and surrounding text are rejected.
///
/// # Examples
///
/// ```
/// use flexpay::utils::parse_amount;
///
/// assert_eq!(parse_amount("10.5").unwrap().to_string(), "10.5");
/// assert!(parse_amount("1,000.00").is_err());
/// assert!(parse_amount("NaN").is_err());
/// ```
pub fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim()).map_err(|e| {
        GatewayError::invalid_amount(DEFAULT_AMOUNT_PARAM, format!("cannot parse '{}': {}", s, e))
    })
}

/// Converts a floating-point amount, rejecting NaN and infinities.
///
/// Prefer [`parse_amount`] or a [`Decimal`] literal: binary floats cannot
/// represent most cent values exactly.
///
/// # Examples
///
/// ```
/// use flexpay::utils::amount_from_f64;
///
/// assert_eq!(amount_from_f64(25.99).unwrap().to_string(), "25.99");
/// assert!(amount_from_f64(f64::NAN).is_err());
/// assert!(amount_from_f64(f64::INFINITY).is_err());
/// ```
pub fn amount_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(GatewayError::invalid_amount(
            DEFAULT_AMOUNT_PARAM,
            "must be a finite number",
        ));
    }

    Decimal::from_f64(value).ok_or_else(|| {
        GatewayError::invalid_amount(DEFAULT_AMOUNT_PARAM, format!("{} is out of range", value))
    })
}

/// Validates an amount for `currency` and renders it with the currency's
/// minor-unit scale.
///
/// `field` is the parameter name reported back in errors.
///
/// # Examples
///
/// ```
/// use flexpay::types::Currency;
/// use flexpay::utils::{format_amount, parse_amount};
///
/// let amount = parse_amount("10").unwrap();
/// assert_eq!(format_amount("Amount", amount, Currency::Aud).unwrap(), "10.00");
///
/// let too_precise = parse_amount("10.005").unwrap();
/// assert!(format_amount("Amount", too_precise, Currency::Aud).is_err());
/// ```
pub fn format_amount(field: &str, amount: Decimal, currency: Currency) -> Result<String> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(GatewayError::invalid_amount(
            field,
            format!("{} is negative", amount),
        ));
    }

    let scale = currency.minor_units();
    if amount.normalize().scale() > scale {
        return Err(GatewayError::invalid_amount(
            field,
            format!("{} has more than {} fractional digits for {}", amount, scale, currency),
        ));
    }

    // -0.00 would otherwise print with its sign
    let mut canonical = if amount.is_zero() { Decimal::ZERO } else { amount };
    canonical.rescale(scale);
    // rescale keeps a smaller scale when the mantissa has no room left
    if canonical.scale() != scale {
        return Err(GatewayError::invalid_amount(
            field,
            format!("{} is out of range for {}", amount, currency),
        ));
    }
    Ok(canonical.to_string())
}

/// Percent-encodes one query key or value.
///
/// Uses `application/x-www-form-urlencoded` rules: ASCII alphanumerics and
/// `*-._` stay literal, everything else is UTF-8 percent-encoded. Spaces
/// follow `spaces`.
///
/// # Examples
///
/// ```
/// use flexpay::contract::SpaceEncoding;
/// use flexpay::utils::encode_query_value;
///
/// assert_eq!(encode_query_value("a b&c", SpaceEncoding::Plus), "a+b%26c");
/// assert_eq!(encode_query_value("a b&c", SpaceEncoding::Percent), "a%20b%26c");
/// ```
pub fn encode_query_value(value: &str, spaces: SpaceEncoding) -> String {
    let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
    match spaces {
        SpaceEncoding::Plus => encoded,
        // a literal '+' is already %2B, so every remaining '+' was a space
        SpaceEncoding::Percent => encoded.replace('+', "%20"),
    }
}

/// Checks an ISO-8601 period of the form `P<n><D|W|M|Y>`, e.g. `P30D`.
pub(crate) fn validate_period(field: &str, period: &str) -> Result<()> {
    let invalid = || {
        GatewayError::invalid_parameter(
            field,
            format!("'{}' is not an ISO-8601 period like P30D or P1M", period),
        )
    };

    let rest = period.strip_prefix('P').ok_or_else(invalid)?;
    let unit = rest.chars().last().ok_or_else(invalid)?;
    let digits = &rest[..rest.len() - unit.len_utf8()];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !matches!(unit, 'D' | 'W' | 'M' | 'Y') {
        return Err(invalid());
    }
    if digits.bytes().all(|b| b == b'0') {
        return Err(invalid());
    }

    Ok(())
}
