//! Caller-supplied values that take precedence over the legacy record.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::patterns::{EMAIL_RE, LANGUAGE_CODE_RE, NAME_RE, PRICE_RE, TWO_CHAR_CODE_RE};

/// Maximum number of override prices.
pub const MAX_PRICES: usize = 3;

/// `ProductComposition` values accepted from callers (List 2).
pub const PRODUCT_COMPOSITIONS: &[&str] = &["00", "01", "02", "03", "10", "11", "20", "30"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "UPPERCASE"))]
pub enum Currency {
    Cad,
    Gbp,
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Cad => "CAD",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
        }
    }

    /// Country the price applies in.
    pub fn country(self) -> &'static str {
        match self {
            Currency::Cad => "CA",
            Currency::Gbp => "GB",
            Currency::Usd => "US",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAD" => Ok(Currency::Cad),
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            other => Err(Error::InvalidInput(format!("unsupported currency {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceOverride {
    pub currency: Currency,
    /// Decimal amount as entered, e.g. `"12.99"`.
    pub amount: String,
}

impl PriceOverride {
    pub fn new(currency: Currency, amount: impl Into<String>) -> Self {
        Self {
            currency,
            amount: amount.into(),
        }
    }
}

/// Sender identity, product codes, language, and prices supplied with a
/// conversion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct PublisherOverride {
    pub sender_name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub product_composition: Option<String>,
    pub product_form: Option<String>,
    pub language_code: Option<String>,
    pub prices: Vec<PriceOverride>,
}

impl PublisherOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject values that would produce an invalid record.
    pub fn validate(&self) -> Result<()> {
        fn field(name: &str, value: &Option<String>, ok: impl Fn(&str) -> bool) -> Result<()> {
            match value.as_deref() {
                Some(v) if !ok(v) => Err(Error::InvalidInput(format!("invalid {name}: {v:?}"))),
                _ => Ok(()),
            }
        }

        field("sender name", &self.sender_name, |v| NAME_RE.is_match(v))?;
        field("contact name", &self.contact_name, |v| NAME_RE.is_match(v))?;
        field("email", &self.email, |v| EMAIL_RE.is_match(v))?;
        field("product composition", &self.product_composition, |v| {
            PRODUCT_COMPOSITIONS.contains(&v)
        })?;
        field("product form", &self.product_form, |v| TWO_CHAR_CODE_RE.is_match(v))?;
        field("language code", &self.language_code, |v| LANGUAGE_CODE_RE.is_match(v))?;

        if self.prices.len() > MAX_PRICES {
            return Err(Error::InvalidInput(format!(
                "at most {MAX_PRICES} prices may be supplied, got {}",
                self.prices.len()
            )));
        }
        let mut seen = HashSet::new();
        for price in &self.prices {
            if !PRICE_RE.is_match(&price.amount) {
                return Err(Error::InvalidInput(format!(
                    "invalid {} price: {:?}",
                    price.currency, price.amount
                )));
            }
            if !seen.insert(price.currency) {
                return Err(Error::InvalidInput(format!(
                    "{} price supplied more than once",
                    price.currency
                )));
            }
        }
        Ok(())
    }
}
