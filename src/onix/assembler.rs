//! ONIX 3.0 message assembly.
//!
//! One conversion moves through fixed stages, each a separate type so a
//! stage cannot be skipped or repeated:
//!
//! ```text
//! Assembler ──build_header──▶ HeaderBuilt ──build_products──▶ ProductsBuilt ──serialize──▶ bytes
//! ```
//!
//! A failure at any stage consumes the assembler; no partial document is
//! ever returned.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::ONIX_30_NAMESPACE;
use super::builders::{Context, Source, build_header, build_product, sender_name};
use super::publisher::PublisherOverride;
use super::tags::expand_short_tags;
use super::tree::Element;
use super::validate::{validate_message, validate_product};
use super::version::{OnixVersion, detect_version};
use super::writer::write_document;
use crate::accessibility::FeatureSet;
use crate::error::{Error, Result};
use crate::patterns::ISBN13_RE;

/// Start of a conversion: inputs checked, nothing built yet.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    features: &'a FeatureSet,
    isbn: &'a str,
    publisher: Option<&'a PublisherOverride>,
    sent_at: NaiveDateTime,
}

/// The message header is built and the legacy record's release is known.
#[derive(Debug)]
pub struct HeaderBuilt<'a> {
    features: &'a FeatureSet,
    isbn: &'a str,
    publisher: Option<&'a PublisherOverride>,
    legacy: Element,
    version: OnixVersion,
    sender_name: String,
    message: Element,
}

/// Every product is assembled and has passed validation.
#[derive(Debug)]
pub struct ProductsBuilt {
    message: Element,
    product_count: usize,
}

impl<'a> Assembler<'a> {
    /// Check the caller's ISBN and overrides.
    pub fn new(
        features: &'a FeatureSet,
        isbn: &'a str,
        publisher: Option<&'a PublisherOverride>,
    ) -> Result<Self> {
        let isbn = isbn.trim();
        if !ISBN13_RE.is_match(isbn) {
            return Err(Error::InvalidInput(format!("ISBN must be 13 digits, got {isbn:?}")));
        }
        if let Some(publisher) = publisher {
            publisher.validate()?;
        }
        let publisher = publisher.filter(|p| !p.is_empty());
        Ok(Self {
            features,
            isbn,
            publisher,
            sent_at: chrono::Local::now().naive_local(),
        })
    }

    /// Use a fixed `SentDateTime` instead of the current time.
    pub fn sent_at(mut self, sent_at: NaiveDateTime) -> Self {
        self.sent_at = sent_at;
        self
    }

    /// Detect the legacy release and build the message header.
    pub fn build_header(self, mut legacy: Element) -> HeaderBuilt<'a> {
        let version = detect_version(&legacy);
        info!(
            release = %version.release,
            reference_tags = version.reference_tags,
            "Detected ONIX version"
        );
        if !version.reference_tags {
            expand_short_tags(&mut legacy);
            debug!("Expanded short tags");
        }

        let sender_name = sender_name(&legacy, self.publisher);
        let mut message = Element::new("ONIXMessage")
            .with_attr("xmlns", ONIX_30_NAMESPACE)
            .with_attr("release", "3.0");

        let ctx = Context {
            features: self.features,
            isbn: self.isbn,
            publisher: self.publisher,
            header: legacy.child("Header"),
            sender_name: &sender_name,
        };
        message.push(build_header(&ctx, version.release, self.sent_at));

        HeaderBuilt {
            features: self.features,
            isbn: self.isbn,
            publisher: self.publisher,
            legacy,
            version,
            sender_name,
            message,
        }
    }
}

impl HeaderBuilt<'_> {
    pub fn version(&self) -> OnixVersion {
        self.version
    }

    /// Build and validate one 3.0 product per legacy product.
    ///
    /// A record with no products yields one product built from the ISBN
    /// and overrides alone.
    pub fn build_products(self) -> Result<ProductsBuilt> {
        let HeaderBuilt {
            features,
            isbn,
            publisher,
            legacy,
            sender_name,
            mut message,
            ..
        } = self;

        let ctx = Context {
            features,
            isbn,
            publisher,
            header: legacy.child("Header"),
            sender_name: &sender_name,
        };

        let empty = Element::new("Product");
        let mut legacy_products = if legacy.name == "Product" {
            vec![&legacy]
        } else {
            legacy.find_all("Product")
        };
        if legacy_products.is_empty() {
            info!("No Product in record; synthesizing one");
            legacy_products.push(&empty);
        }

        for legacy_product in &legacy_products {
            let product = build_product(Source::new(legacy_product), &ctx);
            validate_product(&product)?;
            message.push(product);
        }

        let product_count = legacy_products.len();
        info!(products = product_count, "Assembled products");
        Ok(ProductsBuilt {
            message,
            product_count,
        })
    }
}

impl ProductsBuilt {
    pub fn message(&self) -> &Element {
        &self.message
    }

    pub fn product_count(&self) -> usize {
        self.product_count
    }

    /// Validate the whole message and serialize it as UTF-8 XML.
    pub fn serialize(self) -> Result<Vec<u8>> {
        validate_message(&self.message)?;
        Ok(write_document(&self.message).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onix::tree::parse_document;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_rejects_bad_isbn() {
        let features = FeatureSet::new();
        for isbn in ["978123456789", "97812345678901", "978-1234567890", ""] {
            let err = Assembler::new(&features, isbn, None).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{isbn}");
        }
    }

    #[test]
    fn test_rejects_invalid_override() {
        let features = FeatureSet::new();
        let publisher = PublisherOverride {
            email: Some("not an email".into()),
            ..Default::default()
        };
        assert!(Assembler::new(&features, "9781234567890", Some(&publisher)).is_err());
    }

    #[test]
    fn test_empty_override_dropped() {
        let features = FeatureSet::new();
        let empty = PublisherOverride::default();
        let assembler = Assembler::new(&features, "9781234567890", Some(&empty)).unwrap();
        assert!(assembler.publisher.is_none());

        let named = PublisherOverride {
            sender_name: Some("Named Press".into()),
            ..Default::default()
        };
        let assembler = Assembler::new(&features, "9781234567890", Some(&named)).unwrap();
        assert_eq!(assembler.publisher, Some(&named));
    }

    #[test]
    fn test_stages() {
        let features = FeatureSet::new();
        let legacy = parse_document(
            b"<ONIXMessage release=\"2.1\"><Header><FromCompany>Acme</FromCompany></Header>\
<Product><RecordReference>a</RecordReference></Product>\
<Product><RecordReference>b</RecordReference></Product></ONIXMessage>",
        )
        .unwrap();

        let header = Assembler::new(&features, "9781234567890", None)
            .unwrap()
            .sent_at(fixed_time())
            .build_header(legacy);
        assert_eq!(header.version().release.as_str(), "2.1");

        let products = header.build_products().unwrap();
        assert_eq!(products.product_count(), 2);
        let message = products.message();
        assert_eq!(message.attr("release"), Some("3.0"));
        assert_eq!(
            message.find("SentDateTime").map(Element::text).as_deref(),
            Some("20250102T030405")
        );
        let refs: Vec<String> = message
            .children_named("Product")
            .filter_map(|p| p.child_text("RecordReference"))
            .collect();
        assert_eq!(refs, vec!["a", "b"]);

        let bytes = products.serialize().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<SenderName>Acme</SenderName>"));
    }

    #[test]
    fn test_single_product_root() {
        let features = FeatureSet::new();
        let legacy = parse_document(b"<Product><RecordReference>solo</RecordReference></Product>").unwrap();
        let products = Assembler::new(&features, "9781234567890", None)
            .unwrap()
            .build_header(legacy)
            .build_products()
            .unwrap();
        assert_eq!(products.product_count(), 1);
    }

    #[test]
    fn test_synthesized_product() {
        let features = FeatureSet::new();
        let legacy = parse_document(b"<ONIXMessage><Header/></ONIXMessage>").unwrap();
        let products = Assembler::new(&features, "9781234567890", None)
            .unwrap()
            .build_header(legacy)
            .build_products()
            .unwrap();
        let product = products.message().child("Product").unwrap();
        assert_eq!(product.child_text("RecordReference").as_deref(), Some("9781234567890"));
        assert!(products.serialize().is_ok());
    }
}
