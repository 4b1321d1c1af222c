use std::collections::HashSet;

use tracing::{debug, warn};

use super::{Context, Source, codes_in, conform, publishing, put, put_opt, territory};
use crate::onix::codes;
use crate::onix::order::{PRICE, PRODUCT_SUPPLY, SUPPLIER, SUPPLY_DETAIL, TAX, TERRITORY};
use crate::onix::publisher::PriceOverride;
use crate::onix::tree::Element;

/// Available (List 65).
const DEFAULT_AVAILABILITY: &str = "20";
/// Publisher to retailers (List 93).
const DEFAULT_SUPPLIER_ROLE: &str = "01";
/// RRP excluding tax (List 58).
const DEFAULT_PRICE_TYPE: &str = "01";
/// Not yet priced (List 57).
const DEFAULT_UNPRICED: &str = "01";

/// Price children built explicitly rather than copied.
const BUILT_PRICE_FIELDS: &[&str] = &[
    "PriceType",
    "PriceAmount",
    "CurrencyCode",
    "Territory",
    "TaxType",
    "TaxRatePercent",
    "TaxableAmount",
    "TaxAmount",
];

/// 2.1 tax leaves, gathered into a 3.0 `Tax` composite.
const TAX_FIELDS: &[&str] = &["TaxType", "TaxRatePercent", "TaxableAmount", "TaxAmount"];

const CARRIED_SUPPLY_FIELDS: &[&str] = &["OrderTime", "NewSupplier", "Stock", "PackQuantity", "Reissue"];

fn market_territory(src: Source) -> Element {
    let mut countries = Vec::new();
    let mut regions = Vec::new();
    for detail in src.all("SupplyDetail") {
        countries.extend(codes_in(detail, "SupplyToCountry"));
        regions.extend(codes_in(detail, "SupplyToTerritory"));
    }
    dedup_codes(&mut countries);
    dedup_codes(&mut regions);
    territory(&countries, &regions)
}

/// Drop repeated codes, keeping first occurrences in place.
fn dedup_codes(codes: &mut Vec<String>) {
    let mut seen = HashSet::new();
    codes.retain(|code| seen.insert(code.clone()));
}

fn supplier(legacy: &Element, ctx: &Context) -> Element {
    if let Some(supplier) = legacy.child("Supplier") {
        return conform(supplier);
    }

    let mut supplier = Element::new("Supplier");
    put(
        &SUPPLIER,
        &mut supplier,
        "SupplierRole",
        legacy
            .child_text("SupplierRole")
            .unwrap_or_else(|| DEFAULT_SUPPLIER_ROLE.to_string()),
    );
    for id in legacy.children_named("SupplierIdentifier") {
        SUPPLIER.insert(&mut supplier, conform(id));
    }
    // GLN and SAN travel as plain fields in 2.1
    for (field, id_type) in [("SupplierEANNumber", "06"), ("SupplierSAN", "07")] {
        if let Some(value) = legacy.child_text(field) {
            let id = Element::new("SupplierIdentifier")
                .with_child(Element::leaf("SupplierIDType", id_type))
                .with_child(Element::leaf("IDValue", value));
            SUPPLIER.insert(&mut supplier, id);
        }
    }
    put(
        &SUPPLIER,
        &mut supplier,
        "SupplierName",
        legacy
            .child_text("SupplierName")
            .unwrap_or_else(|| ctx.sender_name.to_string()),
    );
    for field in ["TelephoneNumber", "FaxNumber", "EmailAddress"] {
        for value in legacy.children_named(field) {
            put(&SUPPLIER, &mut supplier, field, value.text());
        }
    }
    for site in legacy.children_named("Website") {
        if let Some(site) = publishing::legacy_website(site) {
            SUPPLIER.insert(&mut supplier, site);
        }
    }
    supplier
}

fn supply_date(role: &str, date: &str) -> Element {
    Element::new("SupplyDate")
        .with_child(Element::leaf("SupplyDateRole", role))
        .with_child(Element::leaf("Date", codes::normalize_date(date)))
}

fn price_date(role: &str, date: &str) -> Element {
    Element::new("PriceDate")
        .with_child(Element::leaf("PriceDateRole", role))
        .with_child(Element::leaf("Date", codes::normalize_date(date)))
}

/// A caller-supplied price, valid in the currency's home country.
fn override_price(price: &PriceOverride) -> Element {
    let mut out = Element::new("Price");
    put(&PRICE, &mut out, "PriceType", DEFAULT_PRICE_TYPE);
    put(&PRICE, &mut out, "PriceAmount", price.amount.trim());
    put(&PRICE, &mut out, "CurrencyCode", price.currency.code());
    PRICE.insert(&mut out, territory(&[price.currency.country().to_string()], &[]));
    out
}

fn price_territory(legacy: &Element) -> Element {
    if let Some(territory) = legacy.child("Territory")
        && territory.has_element_children()
    {
        return conform(territory);
    }
    let countries = codes_in(legacy, "CountryCode");
    let regions = codes_in(legacy, "Territory");
    let mut out = territory(&countries, &regions);
    let excluded = codes_in(legacy, "CountryExcluded");
    if !excluded.is_empty() {
        put(&TERRITORY, &mut out, "CountriesExcluded", excluded.join(" "));
    }
    let excluded = codes_in(legacy, "TerritoryExcluded");
    if !excluded.is_empty() {
        put(&TERRITORY, &mut out, "RegionsExcluded", excluded.join(" "));
    }
    out
}

/// Convert one legacy price; `None` when it has no amount.
fn legacy_price(legacy: &Element, ctx: &Context) -> Option<Element> {
    let Some(amount) = legacy.child_text("PriceAmount") else {
        warn!("Price without PriceAmount skipped");
        return None;
    };

    let mut price = Element::new("Price");
    let price_type = legacy
        .child_text("PriceType")
        .or_else(|| legacy.child_text("PriceTypeCode"))
        .or_else(|| ctx.default_price_type())
        .unwrap_or_else(|| DEFAULT_PRICE_TYPE.to_string());
    put(&PRICE, &mut price, "PriceType", price_type);
    put(&PRICE, &mut price, "PriceAmount", amount);
    put_opt(
        &PRICE,
        &mut price,
        "CurrencyCode",
        legacy.child_text("CurrencyCode").or_else(|| ctx.default_currency()),
    );
    PRICE.insert(&mut price, price_territory(legacy));

    let mut tax = Element::new("Tax");
    for child in legacy.elements() {
        let child = conform(child);
        if TAX_FIELDS.contains(&child.name.as_str()) {
            TAX.insert(&mut tax, child);
        }
    }
    if tax.has_element_children() {
        PRICE.insert(&mut price, tax);
    }

    for (field, role) in [("PriceEffectiveFrom", "14"), ("PriceEffectiveUntil", "15")] {
        if let Some(date) = legacy.child_text(field) {
            PRICE.insert(&mut price, price_date(role, &date));
        }
    }

    for child in legacy.elements() {
        let child = conform(child);
        if BUILT_PRICE_FIELDS.contains(&child.name.as_str()) {
            continue;
        }
        if PRICE.allows(&child.name) {
            PRICE.insert(&mut price, child);
        } else {
            debug!(element = %child.name, "Price field has no 3.0 counterpart; skipped");
        }
    }
    Some(price)
}

fn supply_detail(legacy: &Element, ctx: &Context) -> Element {
    let mut sd = Element::new("SupplyDetail");
    SUPPLY_DETAIL.insert(&mut sd, supplier(legacy, ctx));

    for own in legacy.children_named("SupplierOwnCoding") {
        SUPPLY_DETAIL.insert(&mut sd, conform(own));
    }
    for returns in legacy.children_named("ReturnsConditions") {
        SUPPLY_DETAIL.insert(&mut sd, conform(returns));
    }
    if let (Some(code_type), Some(code)) = (legacy.child_text("ReturnsCodeType"), legacy.child_text("ReturnsCode")) {
        let returns = Element::new("ReturnsConditions")
            .with_child(Element::leaf("ReturnsCodeType", code_type))
            .with_child(Element::leaf("ReturnsCode", code));
        SUPPLY_DETAIL.insert(&mut sd, returns);
    }

    let availability = legacy
        .child_text("ProductAvailability")
        .or_else(|| {
            legacy
                .child_text("AvailabilityCode")
                .map(|code| codes::availability(&code).to_string())
        })
        .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string());
    put(&SUPPLY_DETAIL, &mut sd, "ProductAvailability", availability);

    for date in legacy.children_named("SupplyDate") {
        SUPPLY_DETAIL.insert(&mut sd, conform(date));
    }
    for (field, role) in [("ExpectedShipDate", "08"), ("OnSaleDate", "02")] {
        if let Some(date) = legacy.child_text(field) {
            SUPPLY_DETAIL.insert(&mut sd, supply_date(role, &date));
        }
    }

    for field in CARRIED_SUPPLY_FIELDS {
        for el in legacy.children_named(field) {
            SUPPLY_DETAIL.insert(&mut sd, conform(el));
        }
    }

    insert_prices(&mut sd, legacy.children_named("Price").collect(), legacy.child_text("UnpricedItemType"), ctx);
    sd
}

/// Override prices replace the record's own; a detail with no price is
/// marked unpriced.
fn insert_prices(sd: &mut Element, legacy: Vec<&Element>, unpriced: Option<String>, ctx: &Context) {
    let overrides = ctx.publisher.map(|p| p.prices.as_slice()).unwrap_or_default();
    let prices: Vec<Element> = if overrides.is_empty() {
        legacy.into_iter().filter_map(|p| legacy_price(p, ctx)).collect()
    } else {
        overrides.iter().map(override_price).collect()
    };

    if prices.is_empty() {
        put(
            &SUPPLY_DETAIL,
            sd,
            "UnpricedItemType",
            unpriced.unwrap_or_else(|| DEFAULT_UNPRICED.to_string()),
        );
    }
    for price in prices {
        SUPPLY_DETAIL.insert(sd, price);
    }
}

/// Supply detail for a record that describes none.
fn default_supply_detail(ctx: &Context) -> Element {
    let mut sd = Element::new("SupplyDetail");
    let supplier = Element::new("Supplier")
        .with_child(Element::leaf("SupplierRole", DEFAULT_SUPPLIER_ROLE))
        .with_child(Element::leaf("SupplierName", ctx.sender_name));
    SUPPLY_DETAIL.insert(&mut sd, supplier);
    put(&SUPPLY_DETAIL, &mut sd, "ProductAvailability", DEFAULT_AVAILABILITY);
    insert_prices(&mut sd, Vec::new(), None, ctx);
    sd
}

/// Build `ProductSupply`.
pub fn build(src: Source, ctx: &Context) -> Element {
    let mut ps = Element::new("ProductSupply");

    match src.first("Market") {
        Some(market) => PRODUCT_SUPPLY.insert(&mut ps, conform(market)),
        None => {
            let market = Element::new("Market").with_child(market_territory(src));
            PRODUCT_SUPPLY.insert(&mut ps, market);
        }
    }
    for detail in src.all("MarketPublishingDetail") {
        PRODUCT_SUPPLY.insert(&mut ps, conform(detail));
    }

    let details = src.all("SupplyDetail");
    if details.is_empty() {
        debug!("No SupplyDetail; adding a default one");
        PRODUCT_SUPPLY.insert(&mut ps, default_supply_detail(ctx));
    }
    for detail in details {
        PRODUCT_SUPPLY.insert(&mut ps, supply_detail(detail, ctx));
    }
    ps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::FeatureSet;
    use crate::onix::publisher::{Currency, PublisherOverride};
    use crate::onix::tree::parse_document;

    fn supply(xml: &str, publisher: Option<&PublisherOverride>) -> Element {
        let product = parse_document(xml.as_bytes()).unwrap();
        let features = FeatureSet::new();
        let ctx = Context {
            features: &features,
            isbn: "9781234567890",
            publisher,
            header: None,
            sender_name: "Sender Co",
        };
        build(Source::new(&product), &ctx)
    }

    fn names(el: &Element) -> Vec<&str> {
        el.elements().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_default_supply_detail() {
        let ps = supply("<Product/>", None);
        assert_eq!(names(&ps), vec!["Market", "SupplyDetail"]);
        assert_eq!(
            ps.find("RegionsIncluded").map(Element::text).as_deref(),
            Some("WORLD")
        );
        let sd = ps.child("SupplyDetail").unwrap();
        assert_eq!(names(sd), vec!["Supplier", "ProductAvailability", "UnpricedItemType"]);
        assert_eq!(sd.find("SupplierName").map(Element::text).as_deref(), Some("Sender Co"));
        assert_eq!(sd.child_text("ProductAvailability").as_deref(), Some("20"));
        assert_eq!(sd.child_text("UnpricedItemType").as_deref(), Some("01"));
    }

    #[test]
    fn test_market_countries_deduplicated() {
        let ps = supply(
            "<Product><SupplyDetail><SupplierName>A</SupplierName><SupplyToCountry>CA US</SupplyToCountry></SupplyDetail>\
<SupplyDetail><SupplierName>B</SupplierName><SupplyToCountry>CA</SupplyToCountry>\
<SupplyToTerritory>ROW</SupplyToTerritory></SupplyDetail></Product>",
            None,
        );
        let territory = ps.child("Market").and_then(|m| m.child("Territory")).unwrap();
        assert_eq!(territory.child_text("CountriesIncluded").as_deref(), Some("CA US"));
        assert_eq!(territory.child_text("RegionsIncluded").as_deref(), Some("ROW"));
    }

    #[test]
    fn test_legacy_21_supply_detail() {
        let ps = supply(
            "<Product><SupplyDetail><SupplierName>Dist Inc</SupplierName><SupplierSAN>7654321</SupplierSAN>\
<SupplyToCountry>CA US</SupplyToCountry><AvailabilityCode>IP</AvailabilityCode>\
<OnSaleDate>2021-05-01</OnSaleDate>\
<Price><PriceTypeCode>02</PriceTypeCode><PriceAmount>19.99</PriceAmount><CurrencyCode>CAD</CurrencyCode>\
<CountryCode>CA</CountryCode><TaxRateCode1>Z</TaxRateCode1><PriceEffectiveFrom>20210101</PriceEffectiveFrom></Price>\
<Price><PriceTypeCode>01</PriceTypeCode><CurrencyCode>USD</CurrencyCode></Price>\
</SupplyDetail></Product>",
            None,
        );
        assert_eq!(
            ps.child("Market").and_then(|m| m.find("CountriesIncluded")).map(Element::text).as_deref(),
            Some("CA US")
        );
        let sd = ps.child("SupplyDetail").unwrap();
        assert_eq!(names(sd), vec!["Supplier", "ProductAvailability", "SupplyDate", "Price"]);
        assert_eq!(sd.child_text("ProductAvailability").as_deref(), Some("21"));

        let supplier = sd.child("Supplier").unwrap();
        assert_eq!(names(supplier), vec!["SupplierRole", "SupplierIdentifier", "SupplierName"]);

        let price = sd.child("Price").unwrap();
        assert_eq!(
            names(price),
            vec!["PriceType", "PriceAmount", "CurrencyCode", "Territory", "Tax", "PriceDate"]
        );
        assert_eq!(price.child_text("PriceType").as_deref(), Some("02"));
        assert_eq!(
            price.child("Territory").and_then(|t| t.child_text("CountriesIncluded")).as_deref(),
            Some("CA")
        );
        assert_eq!(price.child("Tax").and_then(|t| t.child_text("TaxType")).as_deref(), Some("Z"));
        assert!(PRICE.check(price).is_ok());
        assert!(SUPPLY_DETAIL.check(sd).is_ok());
    }

    #[test]
    fn test_price_defaults_to_world() {
        let ps = supply(
            "<Product><SupplyDetail><Price><PriceAmount>5.00</PriceAmount></Price></SupplyDetail></Product>",
            None,
        );
        let price = ps.find("Price").unwrap();
        assert_eq!(price.child_text("PriceType").as_deref(), Some("01"));
        assert_eq!(
            price.child("Territory").and_then(|t| t.child_text("RegionsIncluded")).as_deref(),
            Some("WORLD")
        );
    }

    #[test]
    fn test_override_prices_replace_legacy() {
        let publisher = PublisherOverride {
            prices: vec![
                PriceOverride::new(Currency::Cad, "24.99"),
                PriceOverride::new(Currency::Usd, "19.99"),
                PriceOverride::new(Currency::Gbp, "14.99"),
            ],
            ..Default::default()
        };
        let ps = supply(
            "<Product><SupplyDetail><Price><PriceAmount>5.00</PriceAmount></Price></SupplyDetail></Product>",
            Some(&publisher),
        );
        let sd = ps.child("SupplyDetail").unwrap();
        let prices: Vec<&Element> = sd.children_named("Price").collect();
        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].child_text("PriceAmount").as_deref(), Some("24.99"));
        assert_eq!(prices[2].child_text("CurrencyCode").as_deref(), Some("GBP"));
        assert_eq!(
            prices[2].child("Territory").and_then(|t| t.child_text("CountriesIncluded")).as_deref(),
            Some("GB")
        );
        assert!(!sd.has_child("UnpricedItemType"));
    }

    #[test]
    fn test_30_supply_carried() {
        let ps = supply(
            "<Product><ProductSupply><Market><Territory><CountriesIncluded>GB</CountriesIncluded></Territory></Market>\
<SupplyDetail><Supplier><SupplierRole>03</SupplierRole><SupplierName>W</SupplierName></Supplier>\
<ProductAvailability>21</ProductAvailability><UnpricedItemType>03</UnpricedItemType></SupplyDetail></ProductSupply></Product>",
            None,
        );
        assert_eq!(ps.children_named("Market").count(), 1);
        assert_eq!(ps.find("CountriesIncluded").map(Element::text).as_deref(), Some("GB"));
        let sd = ps.child("SupplyDetail").unwrap();
        assert_eq!(sd.find("SupplierRole").map(Element::text).as_deref(), Some("03"));
        assert_eq!(sd.child_text("UnpricedItemType").as_deref(), Some("03"));
    }
}
