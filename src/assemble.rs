//! URL assembly: encodes the signed parameters onto the gateway base path.

use crate::contract::GatewayContract;
use crate::errors::{GatewayError, Result};
use crate::params::Parameters;
use crate::types::SignedUrl;
use crate::utils::encode_query_value;
use url::Url;

/// Appends the encoded parameters and the signature to `base_path`.
///
/// The result is `base_path?k1=v1&k2=v2&...&Signature=...`, keys and values
/// form-urlencoded, the signature always last.
///
/// # Errors
///
/// [`GatewayError::AssemblyFailure`] if `base_path` is not an absolute
/// http(s) URL in normalized form (no surrounding whitespace, raw spaces or
/// backslashes), already has a query or fragment, or there is nothing to
/// send.
///
/// # Examples
///
/// ```
/// use flexpay::assemble::assemble;
/// use flexpay::contract::GatewayContract;
/// use flexpay::params::Parameters;
///
/// let mut params = Parameters::new();
/// params.push("MerchantId", "7");
/// params.push("Reference", "Foo & Bar");
///
/// let url = assemble(
///     "https://secure.verotel.com/startorder",
///     &params,
///     "ABC",
///     &GatewayContract::default(),
/// )
/// .unwrap();
///
/// assert_eq!(
///     url.as_str(),
///     "https://secure.verotel.com/startorder?MerchantId=7&Reference=Foo+%26+Bar&Signature=ABC"
/// );
/// ```
pub fn assemble(
    base_path: &str,
    parameters: &Parameters,
    signature: &str,
    contract: &GatewayContract,
) -> Result<SignedUrl> {
    validate_base_path(base_path)?;
    if parameters.is_empty() {
        return Err(GatewayError::AssemblyFailure {
            field: "parameters".to_string(),
            reason: "no parameters given".to_string(),
        });
    }

    let spaces = contract.spaces;
    let query = parameters
        .iter()
        .map(|p| (p.key.as_str(), p.value.as_str()))
        .chain(std::iter::once((contract.signature_param.as_str(), signature)))
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_query_value(key, spaces),
                encode_query_value(value, spaces)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    Ok(SignedUrl::new(format!("{}?{}", base_path, query)))
}

fn validate_base_path(base_path: &str) -> Result<()> {
    let failure = |reason: String| GatewayError::AssemblyFailure {
        field: "base_path".to_string(),
        reason,
    };

    let url = Url::parse(base_path).map_err(|e| failure(format!("'{}': {}", base_path, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(failure(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(failure("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() || base_path.ends_with('?') {
        return Err(failure("must not carry a query or fragment".to_string()));
    }

    // The raw string is what gets concatenated, so it must already be in the
    // parser's normal form. A bare host is the only accepted difference.
    let normalized = url.as_str();
    let bare_host = url.path() == "/" && normalized.strip_suffix('/') == Some(base_path);
    if normalized != base_path && !bare_host {
        return Err(failure(format!(
            "'{}' is not a normalized URL (expected '{}')",
            base_path, normalized
        )));
    }

    Ok(())
}
