//! # accessonix
//!
//! Remediate ONIX product records with accessibility metadata detected from
//! the matching EPUB.
//!
//! ## Features
//!
//! - Detect EPUB accessibility features as EDItEUR Codelist 196 codes
//! - Infer EPUB Accessibility and WCAG conformance from package metadata
//! - Read ONIX 2.1 (reference or short tags) and ONIX 3.0
//! - Write ONIX 3.0 with accessibility `ProductFormFeature`s and every
//!   composite in schema order
//!
//! ## Quick Start
//!
//! ```no_run
//! use accessonix::{analyze_epub_file, transform_onix};
//!
//! let features = analyze_epub_file("book.epub")?;
//! let legacy = std::fs::read("record.xml")?;
//! let onix = transform_onix(&features, &legacy, "9781234567890", None)?;
//! std::fs::write("record-3.0.xml", onix)?;
//! # Ok::<(), accessonix::Error>(())
//! ```
//!
//! ## Overrides
//!
//! A [`PublisherOverride`] replaces sender details, product codes,
//! language, and prices in the output:
//!
//! ```
//! use accessonix::{Currency, PriceOverride, PublisherOverride};
//!
//! let publisher = PublisherOverride {
//!     sender_name: Some("Example Press".into()),
//!     prices: vec![PriceOverride::new(Currency::Cad, "24.99")],
//!     ..Default::default()
//! };
//! assert!(publisher.validate().is_ok());
//! ```

pub mod accessibility;
pub mod codelist;
pub mod error;
pub mod onix;
pub(crate) mod patterns;
pub(crate) mod util;

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use tracing::instrument;

pub use accessibility::FeatureSet;
pub use codelist::{CODELIST_196, FeatureCode};
pub use error::{Error, Result};
pub use onix::{Currency, OnixRelease, OnixVersion, PriceOverride, PublisherOverride};

/// Detect accessibility features in EPUB bytes.
///
/// Fails with [`Error::MalformedPackage`] when the bytes are not a readable
/// archive or hold no package document.
#[instrument(skip_all, fields(bytes = epub.len()))]
pub fn analyze_accessibility(epub: &[u8]) -> Result<FeatureSet> {
    analyze_accessibility_from_reader(Cursor::new(epub))
}

/// Detect accessibility features from any [`Read`] + [`Seek`] source.
pub fn analyze_accessibility_from_reader<R: Read + Seek>(reader: R) -> Result<FeatureSet> {
    accessibility::detect(reader)
}

/// Detect accessibility features in an EPUB file.
///
/// # Example
///
/// ```no_run
/// let features = accessonix::analyze_epub_file("book.epub")?;
/// for code in features.iter() {
///     println!("{:02} {}", code.value(), code.description());
/// }
/// # Ok::<(), accessonix::Error>(())
/// ```
pub fn analyze_epub_file<P: AsRef<Path>>(path: P) -> Result<FeatureSet> {
    let file = std::fs::File::open(path)?;
    analyze_accessibility_from_reader(file)
}

/// Rebuild an ONIX record as ONIX 3.0 carrying `features`.
///
/// `isbn` must be 13 digits. Either a complete, validated document is
/// returned or an error; there is no partial output.
#[instrument(skip_all, fields(isbn = isbn, bytes = onix.len()))]
pub fn transform_onix(
    features: &FeatureSet,
    onix: &[u8],
    isbn: &str,
    publisher: Option<&PublisherOverride>,
) -> Result<Vec<u8>> {
    let assembler = onix::Assembler::new(features, isbn, publisher)?;
    let legacy = onix::parse_document(onix)?;
    assembler
        .build_header(legacy)
        .build_products()?
        .serialize()
}

/// [`transform_onix`] over an ONIX file on disk.
pub fn transform_onix_file<P: AsRef<Path>>(
    features: &FeatureSet,
    path: P,
    isbn: &str,
    publisher: Option<&PublisherOverride>,
) -> Result<Vec<u8>> {
    let onix = std::fs::read(path)?;
    transform_onix(features, &onix, isbn, publisher)
}
