//! Cached regex patterns for content scans and field validation.
//!
//! Uses LazyLock to compile patterns once on first use. The patterns are
//! process-wide and read-only, so concurrent conversions share them freely.

use regex_lite::Regex;
use std::sync::LazyLock;

// === Content document patterns ===

/// Matches a start tag carrying a `lang` or `xml:lang` attribute
pub static LANG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<[^>]+\s(?:lang|xml:lang)\s*=\s*["']([^"']+)["'][^>]*>"#).unwrap()
});

// === Field validation patterns ===

/// ISBN-13 as supplied by the caller (digits only)
pub static ISBN13_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{13}$").unwrap());

/// Price amount with at most two decimal places
pub static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").unwrap());

/// ISO 639-2/B language code
pub static LANGUAGE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3}$").unwrap());

/// Sender and contact names
pub static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-'\.]+$").unwrap());

pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Two-character ONIX code (composition, form)
pub static TWO_CHAR_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2}$").unwrap());
