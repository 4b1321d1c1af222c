//! Builders for the composites of an ONIX 3.0 product.
//!
//! Each builder reads the legacy product through [`Source`], which sees a
//! 2.1 product's flat children and a 3.0 product's blocks alike, and
//! returns a composite ordered per its table in [`crate::onix::order`].

mod collateral;
mod descriptive;
mod header;
mod product;
mod publishing;
mod related;
mod supply;

pub use header::{DEFAULT_SENDER_NAME, build_header, remediation_note, sender_name};
pub use product::build_product;

use tracing::debug;

use super::codes;
use super::order::{CompositeOrder, order_for};
use super::publisher::PublisherOverride;
use super::tree::{Element, Node};
use crate::accessibility::FeatureSet;

/// 3.0 blocks whose children are looked up as if they were product children.
const BLOCKS: &[&str] = &[
    "DescriptiveDetail",
    "CollateralDetail",
    "PublishingDetail",
    "RelatedMaterial",
    "ProductSupply",
];

/// Read access to one legacy product.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    product: &'a Element,
}

impl<'a> Source<'a> {
    pub fn new(product: &'a Element) -> Self {
        Self { product }
    }

    fn scopes(&self) -> impl Iterator<Item = &'a Element> {
        let product = self.product;
        std::iter::once(product).chain(BLOCKS.iter().filter_map(move |block| product.child(block)))
    }

    /// Every element called `name` directly under the product or one of its blocks.
    pub fn all(&self, name: &str) -> Vec<&'a Element> {
        self.scopes()
            .flat_map(|scope| scope.children_named(name))
            .collect()
    }

    pub fn first(&self, name: &str) -> Option<&'a Element> {
        self.scopes().find_map(|scope| scope.child(name))
    }

    /// First non-empty text of an element called `name`.
    pub fn text(&self, name: &str) -> Option<String> {
        self.scopes().find_map(|scope| scope.child_text(name))
    }
}

/// Inputs shared by every builder in one conversion.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub features: &'a FeatureSet,
    pub isbn: &'a str,
    pub publisher: Option<&'a PublisherOverride>,
    /// Legacy message header, for message-wide defaults.
    pub header: Option<&'a Element>,
    /// Resolved sender, reused where a supplier name is required.
    pub sender_name: &'a str,
}

impl<'a> Context<'a> {
    /// An override field, when the caller supplied one.
    pub fn overriding(&self, pick: impl Fn(&'a PublisherOverride) -> Option<&'a String>) -> Option<String> {
        self.publisher
            .and_then(pick)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn header_text(&self, names: &[&str]) -> Option<String> {
        let header = self.header?;
        names.iter().find_map(|name| header.child_text(name))
    }

    pub fn default_language(&self) -> Option<String> {
        self.header_text(&["DefaultLanguageOfText"])
    }

    pub fn default_currency(&self) -> Option<String> {
        self.header_text(&["DefaultCurrencyCode"])
    }

    pub fn default_price_type(&self) -> Option<String> {
        self.header_text(&["DefaultPriceType", "DefaultPriceTypeCode"])
    }
}

/// Copy a legacy subtree into 3.0 form.
///
/// Renamed elements take their 3.0 names, and children of any ordered
/// composite are re-inserted in table order. Children that have no place
/// in a 3.0 composite are dropped.
pub fn conform(el: &Element) -> Element {
    let mut out = Element::new(codes::rename(&el.name));
    out.attributes = el.attributes.clone();

    match order_for(&out.name) {
        Some(order) => {
            for child in el.elements() {
                let child = conform(child);
                if order.allows(&child.name) {
                    order.insert(&mut out, child);
                } else {
                    debug!(composite = order.composite, element = %child.name, "No 3.0 counterpart; skipped");
                }
            }
        }
        None => {
            for node in &el.children {
                match node {
                    Node::Element(child) => out.push(conform(child)),
                    Node::Text(text) => out.children.push(Node::Text(text.clone())),
                }
            }
        }
    }
    out
}

/// Insert a text leaf.
pub(crate) fn put(order: &CompositeOrder, parent: &mut Element, name: &str, value: impl Into<String>) {
    order.insert(parent, Element::leaf(name, value));
}

/// Insert a text leaf when a value is present.
pub(crate) fn put_opt(order: &CompositeOrder, parent: &mut Element, name: &str, value: Option<String>) {
    if let Some(value) = value {
        put(order, parent, name, value);
    }
}

/// A `Territory` for space-separated country codes, or the whole world.
pub(crate) fn territory(countries: &[String], regions: &[String]) -> Element {
    let mut territory = Element::new("Territory");
    let order = &super::order::TERRITORY;
    if !countries.is_empty() {
        put(order, &mut territory, "CountriesIncluded", countries.join(" "));
    }
    if !regions.is_empty() {
        put(order, &mut territory, "RegionsIncluded", regions.join(" "));
    }
    if countries.is_empty() && regions.is_empty() {
        put(order, &mut territory, "RegionsIncluded", "WORLD");
    }
    territory
}

/// Non-empty texts of children called `name`, split on whitespace.
pub(crate) fn codes_in(el: &Element, name: &str) -> Vec<String> {
    el.children_named(name)
        .flat_map(|c| {
            c.text()
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onix::tree::parse_document;

    #[test]
    fn test_source_sees_blocks() {
        let product = parse_document(
            b"<Product><RecordReference>r</RecordReference>\
<DescriptiveDetail><ProductForm>EA</ProductForm></DescriptiveDetail>\
<ProductSupply><SupplyDetail/><SupplyDetail/></ProductSupply></Product>",
        )
        .unwrap();
        let src = Source::new(&product);
        assert_eq!(src.text("RecordReference").as_deref(), Some("r"));
        assert_eq!(src.text("ProductForm").as_deref(), Some("EA"));
        assert_eq!(src.all("SupplyDetail").len(), 2);
        assert!(src.first("Missing").is_none());
    }

    #[test]
    fn test_conform_renames_and_orders() {
        let contributor = parse_document(
            b"<Contributor><PersonName>A B</PersonName><ContributorRole>A01</ContributorRole>\
<CountryCode>US</CountryCode>\
<PersonNameIdentifier><PersonNameIDType>16</PersonNameIDType><IDValue>1</IDValue></PersonNameIdentifier>\
<SequenceNumber>1</SequenceNumber></Contributor>",
        )
        .unwrap();
        let out = conform(&contributor);
        let names: Vec<&str> = out.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["SequenceNumber", "ContributorRole", "NameIdentifier", "PersonName"]
        );
        assert_eq!(
            out.child("NameIdentifier").and_then(|n| n.child_text("NameIDType")).as_deref(),
            Some("16")
        );
    }

    #[test]
    fn test_conform_keeps_markup_in_text() {
        let text = parse_document(b"<Text textformat=\"05\"><p>Hello <em>world</em></p></Text>").unwrap();
        let out = conform(&text);
        assert_eq!(out, text);
    }

    #[test]
    fn test_territory() {
        let world = territory(&[], &[]);
        assert_eq!(world.child_text("RegionsIncluded").as_deref(), Some("WORLD"));

        let t = territory(&["CA".into(), "US".into()], &[]);
        assert_eq!(t.child_text("CountriesIncluded").as_deref(), Some("CA US"));
        assert!(!t.has_child("RegionsIncluded"));
    }
}
