use tracing::debug;

use super::{Source, codes_in, conform, put, territory};
use crate::onix::codes;
use crate::onix::order::{PUBLISHER, PUBLISHING_DETAIL, WEBSITE};
use crate::onix::tree::{Element, Node};

/// Active (List 64).
const DEFAULT_PUBLISHING_STATUS: &str = "04";
/// Publisher (List 45).
const DEFAULT_PUBLISHING_ROLE: &str = "01";
/// Unspecified website role (List 73).
const DEFAULT_WEBSITE_ROLE: &str = "01";

const CARRIED: &[&str] = &[
    "CityOfPublication",
    "CountryOfPublication",
    "ProductContact",
    "PublishingStatusNote",
    "PublishingDate",
    "LatestReprintNumber",
    "CopyrightStatement",
    "ROWSalesRightsType",
    "SalesRestriction",
];

fn website(role: Option<String>, description: Option<String>, link: String) -> Element {
    let mut site = Element::new("Website");
    put(&WEBSITE, &mut site, "WebsiteRole", role.unwrap_or_else(|| DEFAULT_WEBSITE_ROLE.to_string()));
    if let Some(description) = description {
        put(&WEBSITE, &mut site, "WebsiteDescription", description);
    }
    put(&WEBSITE, &mut site, "WebsiteLink", link);
    site
}

pub(super) fn legacy_website(site: &Element) -> Option<Element> {
    let link = site.child_text("WebsiteLink")?;
    Some(website(
        site.child_text("WebsiteRole"),
        site.child_text("WebsiteDescription"),
        link,
    ))
}

/// 2.1 name codes become an identifier composite.
fn name_identifier(el: &Element, composite: &str, type_field: &str) -> Option<Element> {
    let id_type = el.child_text("NameCodeType")?;
    let value = el.child_text("NameCodeValue")?;
    let mut id = Element::new(composite).with_child(Element::leaf(type_field, id_type));
    if let Some(name) = el.child_text("NameCodeTypeName") {
        id.push(Element::leaf("IDTypeName", name));
    }
    Some(id.with_child(Element::leaf("IDValue", value)))
}

fn imprint(legacy: &Element) -> Element {
    let mut imprint = Element::new("Imprint");
    for id in legacy.children_named("ImprintIdentifier") {
        imprint.push(conform(id));
    }
    if let Some(id) = name_identifier(legacy, "ImprintIdentifier", "ImprintIDType") {
        imprint.push(id);
    }
    if let Some(name) = legacy.child_text("ImprintName") {
        imprint.push(Element::leaf("ImprintName", name));
    }
    imprint
}

fn publisher(legacy: &Element) -> Element {
    let mut publisher = Element::new("Publisher");
    put(
        &PUBLISHER,
        &mut publisher,
        "PublishingRole",
        legacy
            .child_text("PublishingRole")
            .unwrap_or_else(|| DEFAULT_PUBLISHING_ROLE.to_string()),
    );
    for id in legacy.children_named("PublisherIdentifier") {
        PUBLISHER.insert(&mut publisher, conform(id));
    }
    if let Some(id) = name_identifier(legacy, "PublisherIdentifier", "PublisherIDType") {
        PUBLISHER.insert(&mut publisher, id);
    }
    if let Some(name) = legacy.child_text("PublisherName") {
        put(&PUBLISHER, &mut publisher, "PublisherName", name);
    }
    for funding in legacy.children_named("Funding") {
        PUBLISHER.insert(&mut publisher, conform(funding));
    }
    for site in legacy.children_named("Website") {
        match legacy_website(site) {
            Some(site) => PUBLISHER.insert(&mut publisher, site),
            None => debug!("Publisher website without link skipped"),
        }
    }
    publisher
}

/// 2.1 `SalesRights` carries territory as plain fields.
fn sales_rights(legacy: &Element) -> Element {
    if legacy.has_child("Territory") {
        return conform(legacy);
    }
    let mut rights = Element::new("SalesRights");
    if let Some(rights_type) = legacy.child_text("SalesRightsType") {
        rights.push(Element::leaf("SalesRightsType", rights_type));
    }
    let countries = codes_in(legacy, "RightsCountry");
    let regions = codes_in(legacy, "RightsTerritory");
    rights.push(territory(&countries, &regions));
    rights
}

/// Build `PublishingDetail`.
pub fn build(src: Source) -> Element {
    let mut pd = Element::new("PublishingDetail");

    for legacy in src.all("Imprint") {
        PUBLISHING_DETAIL.insert(&mut pd, imprint(legacy));
    }
    for legacy in src.all("Publisher") {
        PUBLISHING_DETAIL.insert(&mut pd, publisher(legacy));
    }
    // some 2.1 feeds name the publisher and imprint at product level
    if !pd.has_child("Publisher")
        && let Some(name) = src.text("PublisherName")
    {
        let publisher = Element::new("Publisher")
            .with_child(Element::leaf("PublishingRole", DEFAULT_PUBLISHING_ROLE))
            .with_child(Element::leaf("PublisherName", name));
        PUBLISHING_DETAIL.insert(&mut pd, publisher);
    }
    if !pd.has_child("Imprint")
        && let Some(name) = src.text("ImprintName")
    {
        PUBLISHING_DETAIL.insert(&mut pd, Element::new("Imprint").with_child(Element::leaf("ImprintName", name)));
    }

    // 2.1 product websites hang off the first publisher in 3.0
    let product_sites: Vec<Element> = src
        .all("ProductWebsite")
        .into_iter()
        .filter_map(|site| {
            let link = site.child_text("ProductWebsiteLink")?;
            Some(website(
                site.child_text("WebsiteRole"),
                site.child_text("ProductWebsiteDescription"),
                link,
            ))
        })
        .collect();
    if !product_sites.is_empty() {
        let first_publisher = pd.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == "Publisher" => Some(el),
            _ => None,
        });
        match first_publisher {
            Some(publisher) => {
                for site in product_sites {
                    PUBLISHER.insert(publisher, site);
                }
            }
            None => debug!("ProductWebsite without a Publisher skipped"),
        }
    }

    for name in CARRIED {
        for el in src.all(name) {
            PUBLISHING_DETAIL.insert(&mut pd, conform(el));
        }
    }

    put(
        &PUBLISHING_DETAIL,
        &mut pd,
        "PublishingStatus",
        src.text("PublishingStatus")
            .unwrap_or_else(|| DEFAULT_PUBLISHING_STATUS.to_string()),
    );

    if !pd.has_child("PublishingDate") {
        for (field, role) in [("PublicationDate", "01"), ("YearFirstPublished", "11")] {
            if let Some(date) = src.text(field) {
                let date = Element::new("PublishingDate")
                    .with_child(Element::leaf("PublishingDateRole", role))
                    .with_child(Element::leaf("Date", codes::normalize_date(&date)));
                PUBLISHING_DETAIL.insert(&mut pd, date);
            }
        }
    }

    if !pd.has_child("CopyrightStatement")
        && let Some(year) = src.text("CopyrightYear")
    {
        let statement = Element::new("CopyrightStatement").with_child(Element::leaf("CopyrightYear", year));
        PUBLISHING_DETAIL.insert(&mut pd, statement);
    }

    for legacy in src.all("SalesRights") {
        PUBLISHING_DETAIL.insert(&mut pd, sales_rights(legacy));
    }

    pd
}
