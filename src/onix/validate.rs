//! Checks run over an assembled ONIX 3.0 message before it is serialized.
//!
//! Only the rules the builders rely on are enforced: required children and
//! composite ordering. A failure here means a builder is wrong, not the
//! input, so every error is [`Error::Validation`].

use super::order::order_for;
use super::tree::Element;
use crate::error::{Error, Result};

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

fn require<'a>(parent: &'a Element, name: &str) -> Result<&'a Element> {
    parent
        .child(name)
        .ok_or_else(|| invalid(format!("{} is missing {}", parent.name, name)))
}

fn require_text(parent: &Element, name: &str) -> Result<()> {
    match parent.child_text(name) {
        Some(_) => Ok(()),
        None => Err(invalid(format!("{} is missing {}", parent.name, name))),
    }
}

/// Check composite ordering over a whole subtree.
pub fn check_orders(el: &Element) -> Result<()> {
    if let Some(order) = order_for(&el.name) {
        order.check(el)?;
    }
    el.elements().try_for_each(check_orders)
}

fn validate_text_content(content: &Element) -> Result<()> {
    require_text(content, "TextType")?;
    require_text(content, "ContentAudience")?;
    require(content, "Text")?;
    Ok(())
}

fn validate_website(site: &Element) -> Result<()> {
    require_text(site, "WebsiteLink")
}

fn validate_supply_detail(sd: &Element) -> Result<()> {
    require(sd, "Supplier")?;
    require_text(sd, "ProductAvailability")?;
    let prices: Vec<&Element> = sd.children_named("Price").collect();
    if prices.is_empty() && !sd.has_child("UnpricedItemType") {
        return Err(invalid("SupplyDetail has neither Price nor UnpricedItemType"));
    }
    for price in prices {
        require_text(price, "PriceAmount")?;
    }
    Ok(())
}

/// Required elements of one `Product`, and ordering throughout it.
pub fn validate_product(product: &Element) -> Result<()> {
    require_text(product, "RecordReference")?;
    require_text(product, "NotificationType")?;
    require(product, "ProductIdentifier")?;

    let dd = require(product, "DescriptiveDetail")?;
    require_text(dd, "ProductComposition")?;
    require_text(dd, "ProductForm")?;

    let ps = require(product, "ProductSupply")?;
    require(ps, "SupplyDetail")?;
    for sd in ps.children_named("SupplyDetail") {
        validate_supply_detail(sd)?;
    }

    for content in product.find_all("TextContent") {
        validate_text_content(content)?;
    }
    for site in product.find_all("Website") {
        validate_website(site)?;
    }

    check_orders(product)
}

/// Message-level checks: root, header, and every product.
pub fn validate_message(message: &Element) -> Result<()> {
    if message.name != "ONIXMessage" {
        return Err(invalid(format!("root element is {}, not ONIXMessage", message.name)));
    }
    if message.attr("release") != Some("3.0") {
        return Err(invalid("ONIXMessage must declare release 3.0"));
    }

    let header = require(message, "Header")?;
    let sender = require(header, "Sender")?;
    require_text(sender, "SenderName")?;
    require_text(header, "SentDateTime")?;
    check_orders(header)?;

    let mut products = message.children_named("Product").peekable();
    if products.peek().is_none() {
        return Err(invalid("message has no Product"));
    }
    products.try_for_each(validate_product)
}
