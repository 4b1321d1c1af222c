use std::collections::HashSet;

use tracing::debug;

use super::{Context, Source, collateral, descriptive, publishing, put, put_opt, related, supply};
use crate::onix::order::PRODUCT;
use crate::onix::tree::Element;

const DEFAULT_NOTIFICATION_TYPE: &str = "03";

/// ISBN-13 (List 5).
const ISBN13: &str = "15";
/// Proprietary identifier (List 5).
const PROPRIETARY: &str = "01";

fn identifier(id_type: &str, type_name: Option<String>, value: &str) -> Element {
    let mut id = Element::new("ProductIdentifier").with_child(Element::leaf("ProductIDType", id_type));
    if let Some(name) = type_name {
        id.push(Element::leaf("IDTypeName", name));
    }
    id.with_child(Element::leaf("IDValue", value))
}

/// Product identifiers, each (type, value) pair once.
///
/// Legacy `ProductIdentifier`s come first, then `WorkIdentifier`s promoted
/// to product identifiers, then the supplied ISBN unless an ISBN-13 is
/// already present.
fn identifiers(src: Source, ctx: &Context) -> Vec<Element> {
    let mut ids = Identifiers::default();

    for id in src.all("ProductIdentifier") {
        match (id.child_text("ProductIDType"), id.child_text("IDValue")) {
            (Some(id_type), Some(value)) => ids.emit(&id_type, id.child_text("IDTypeName"), &value),
            _ => debug!("ProductIdentifier without type or value skipped"),
        }
    }

    for work in src.all("WorkIdentifier") {
        let (Some(work_type), Some(value)) = (work.child_text("WorkIDType"), work.child_text("IDValue")) else {
            continue;
        };
        let id_type = if work_type == ISBN13 { ISBN13 } else { PROPRIETARY };
        let type_name = (id_type == PROPRIETARY)
            .then(|| work.child_text("IDTypeName"))
            .flatten();
        ids.emit(id_type, type_name, &value);
    }

    if !ids.has_type(ISBN13) {
        ids.emit(ISBN13, None, ctx.isbn);
    }
    ids.out
}

#[derive(Default)]
struct Identifiers {
    seen: HashSet<(String, String)>,
    out: Vec<Element>,
}

impl Identifiers {
    fn emit(&mut self, id_type: &str, type_name: Option<String>, value: &str) {
        if self.seen.insert((id_type.to_string(), value.to_string())) {
            self.out.push(identifier(id_type, type_name, value));
        } else {
            debug!(id_type, value, "Duplicate identifier skipped");
        }
    }

    fn has_type(&self, id_type: &str) -> bool {
        self.seen.iter().any(|(t, _)| t == id_type)
    }
}

/// 2.1 `Barcode` is a bare code; 3.0 wraps it in a composite.
fn barcodes(src: Source) -> Vec<Element> {
    src.all("Barcode")
        .into_iter()
        .filter_map(|barcode| {
            if barcode.has_element_children() {
                return Some(super::conform(barcode));
            }
            let code = barcode.text();
            (!code.is_empty())
                .then(|| Element::new("Barcode").with_child(Element::leaf("BarcodeType", code)))
        })
        .collect()
}

/// Assemble one 3.0 `Product` from a legacy product.
pub fn build_product(src: Source, ctx: &Context) -> Element {
    let mut product = Element::new("Product");

    let reference = src.text("RecordReference").unwrap_or_else(|| ctx.isbn.to_string());
    put(&PRODUCT, &mut product, "RecordReference", reference);
    put(
        &PRODUCT,
        &mut product,
        "NotificationType",
        src.text("NotificationType")
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string()),
    );
    put_opt(&PRODUCT, &mut product, "RecordSourceType", src.text("RecordSourceType"));
    put_opt(&PRODUCT, &mut product, "RecordSourceName", src.text("RecordSourceName"));

    for id in identifiers(src, ctx) {
        PRODUCT.insert(&mut product, id);
    }
    for barcode in barcodes(src) {
        PRODUCT.insert(&mut product, barcode);
    }

    PRODUCT.insert(&mut product, descriptive::build(src, ctx));
    if let Some(collateral) = collateral::build(src) {
        PRODUCT.insert(&mut product, collateral);
    }
    PRODUCT.insert(&mut product, publishing::build(src));
    if let Some(related) = related::build(src) {
        PRODUCT.insert(&mut product, related);
    }
    PRODUCT.insert(&mut product, supply::build(src, ctx));

    product
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::FeatureSet;
    use crate::onix::tree::parse_document;

    fn ids(xml: &str) -> Vec<(String, String)> {
        let product = parse_document(xml.as_bytes()).unwrap();
        let features = FeatureSet::new();
        let ctx = Context {
            features: &features,
            isbn: "9781234567890",
            publisher: None,
            header: None,
            sender_name: "Sender",
        };
        identifiers(Source::new(&product), &ctx)
            .iter()
            .map(|id| {
                (
                    id.child_text("ProductIDType").unwrap_or_default(),
                    id.child_text("IDValue").unwrap_or_default(),
                )
            })
            .collect()
    }

    fn pair(t: &str, v: &str) -> (String, String) {
        (t.to_string(), v.to_string())
    }

    #[test]
    fn test_duplicates_removed() {
        let got = ids("<Product>\
<ProductIdentifier><ProductIDType>15</ProductIDType><IDValue>9780000000002</IDValue></ProductIdentifier>\
<ProductIdentifier><ProductIDType>03</ProductIDType><IDValue>9780000000002</IDValue></ProductIdentifier>\
<ProductIdentifier><ProductIDType>15</ProductIDType><IDValue>9780000000002</IDValue></ProductIdentifier>\
</Product>");
        assert_eq!(got, vec![pair("15", "9780000000002"), pair("03", "9780000000002")]);
    }

    #[test]
    fn test_supplied_isbn_added_when_missing() {
        let got = ids("<Product><ProductIdentifier><ProductIDType>01</ProductIDType><IDValue>X1</IDValue></ProductIdentifier></Product>");
        assert_eq!(got, vec![pair("01", "X1"), pair("15", "9781234567890")]);
    }

    #[test]
    fn test_work_identifier_promoted_once() {
        let got = ids("<Product>\
<ProductIdentifier><ProductIDType>01</ProductIDType><IDValue>W9</IDValue></ProductIdentifier>\
<WorkIdentifier><WorkIDType>01</WorkIDType><IDValue>W9</IDValue></WorkIdentifier>\
<WorkIdentifier><WorkIDType>15</WorkIDType><IDValue>9781234567890</IDValue></WorkIdentifier>\
</Product>");
        assert_eq!(got, vec![pair("01", "W9"), pair("15", "9781234567890")]);
    }

    #[test]
    fn test_barcode_wrapped() {
        let product = parse_document(b"<Product><Barcode>03</Barcode></Product>").unwrap();
        let out = barcodes(Source::new(&product));
        assert_eq!(out[0].child_text("BarcodeType").as_deref(), Some("03"));
    }
}
