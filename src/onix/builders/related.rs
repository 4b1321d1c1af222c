use tracing::debug;

use super::{Source, conform, put};
use crate::onix::codes;
use crate::onix::order::{RELATED_MATERIAL, RELATED_PRODUCT, RELATED_WORK};
use crate::onix::tree::Element;

/// "Manifestation of" (List 164).
const MANIFESTATION_OF: &str = "01";

/// 2.1 `WorkIdentifier` describes the work this product manifests.
fn related_work(work: &Element) -> Option<Element> {
    let (Some(id_type), Some(value)) = (work.child_text("WorkIDType"), work.child_text("IDValue")) else {
        debug!("WorkIdentifier without type or value skipped");
        return None;
    };
    let mut id = Element::new("WorkIdentifier").with_child(Element::leaf("WorkIDType", id_type));
    if let Some(name) = work.child_text("IDTypeName") {
        id.push(Element::leaf("IDTypeName", name));
    }
    id.push(Element::leaf("IDValue", value));

    let mut related = Element::new("RelatedWork");
    put(&RELATED_WORK, &mut related, "WorkRelationCode", MANIFESTATION_OF);
    RELATED_WORK.insert(&mut related, id);
    Some(related)
}

fn related_product(legacy: &Element) -> Option<Element> {
    let ids: Vec<Element> = legacy
        .children_named("ProductIdentifier")
        .filter(|id| id.has_child("IDValue"))
        .map(conform)
        .collect();
    if ids.is_empty() {
        debug!("RelatedProduct without identifier skipped");
        return None;
    }

    let mut related = Element::new("RelatedProduct");
    for name in ["ProductRelationCode", "RelationCode"] {
        for code in legacy.children_named(name) {
            put(&RELATED_PRODUCT, &mut related, "ProductRelationCode", code.text());
        }
    }
    for id in ids {
        RELATED_PRODUCT.insert(&mut related, id);
    }
    if let Some(form) = legacy.child_text("ProductForm") {
        put(&RELATED_PRODUCT, &mut related, "ProductForm", codes::product_form(&form));
    }

    let details: Vec<String> = legacy
        .children_named("ProductFormDetail")
        .map(Element::text)
        .filter(|d| !d.is_empty())
        .collect();
    if details.is_empty() {
        if let Some(epub_type) = legacy.child_text("EpubType") {
            put(
                &RELATED_PRODUCT,
                &mut related,
                "ProductFormDetail",
                codes::epub_type_form_detail(&epub_type),
            );
        }
    } else {
        for detail in details {
            put(&RELATED_PRODUCT, &mut related, "ProductFormDetail", detail);
        }
    }
    Some(related)
}

/// Build `RelatedMaterial`, or nothing when the record relates to nothing.
pub fn build(src: Source) -> Option<Element> {
    let mut rm = Element::new("RelatedMaterial");

    for work in src.all("RelatedWork") {
        RELATED_MATERIAL.insert(&mut rm, conform(work));
    }
    for work in src.all("WorkIdentifier") {
        if let Some(related) = related_work(work) {
            RELATED_MATERIAL.insert(&mut rm, related);
        }
    }
    for product in src.all("RelatedProduct") {
        if let Some(related) = related_product(product) {
            RELATED_MATERIAL.insert(&mut rm, related);
        }
    }

    rm.has_element_children().then_some(rm)
}
