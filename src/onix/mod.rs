//! ONIX reading, transformation, and writing.
//!
//! Legacy records (ONIX 2.1 in either tag format, or 3.0) are parsed into a
//! lightweight [`tree::Element`] tree, rebuilt composite by composite into an
//! ONIX 3.0 message, validated, and serialized.

pub mod assembler;
pub mod builders;
pub mod codes;
pub mod order;
pub mod publisher;
pub mod tags;
pub mod tree;
pub mod validate;
pub mod version;
pub mod writer;

pub use assembler::{Assembler, HeaderBuilt, ProductsBuilt};
pub use publisher::{Currency, PriceOverride, PublisherOverride};
pub use tree::{Element, Node, parse_document};
pub use version::{OnixRelease, OnixVersion, detect_version};
pub use writer::write_document;

/// ONIX 3.0 reference-tag namespace.
pub const ONIX_30_NAMESPACE: &str = "http://ns.editeur.org/onix/3.0/reference";
