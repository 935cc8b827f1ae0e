//! Basic email syntax checks.
//!
//! Deliverability and reputation are judged by the verification provider;
//! this module only decides whether an address is worth sending there.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Validates basic email format: `local@domain.tld` with no whitespace and a
/// single `@`, after trimming surrounding whitespace.
///
/// ```
/// use signup_qualifier::email_format::is_valid_format;
///
/// assert!(is_valid_format(Some("john@stripe.com")));
/// assert!(!is_valid_format(Some("hello@")));
/// assert!(!is_valid_format(None));
/// ```
pub fn is_valid_format(email: Option<&str>) -> bool {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => EMAIL_SHAPE.is_match(email),
        _ => false,
    }
}

/// Extracts the lowercase domain after the last `@`.
///
/// Returns `None` for absent or blank input, input without `@`, or an empty domain.
pub fn extract_domain(email: Option<&str>) -> Option<String> {
    let email = email.map(str::trim).filter(|e| !e.is_empty())?;
    let (_, domain) = email.rsplit_once('@')?;
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_lowercase())
}
