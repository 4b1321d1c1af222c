//! Declared child order of the ONIX 3.0 composites the assembler emits.
//!
//! Builders insert children through [`CompositeOrder::insert`], so a
//! composite is ordered by construction whatever order its sources are
//! visited in. Validation re-checks every table once the document is
//! complete.

use super::tree::{Element, Node};
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct CompositeOrder {
    pub composite: &'static str,
    pub children: &'static [&'static str],
}

pub static HEADER: CompositeOrder = CompositeOrder {
    composite: "Header",
    children: &[
        "Sender",
        "Addressee",
        "MessageNumber",
        "MessageRepeat",
        "SentDateTime",
        "MessageNote",
        "DefaultLanguageOfText",
        "DefaultPriceType",
        "DefaultCurrencyCode",
    ],
};

pub static SENDER: CompositeOrder = CompositeOrder {
    composite: "Sender",
    children: &[
        "SenderIdentifier",
        "SenderName",
        "ContactName",
        "TelephoneNumber",
        "EmailAddress",
    ],
};

pub static PRODUCT: CompositeOrder = CompositeOrder {
    composite: "Product",
    children: &[
        "RecordReference",
        "NotificationType",
        "DeletionText",
        "RecordSourceType",
        "RecordSourceIdentifier",
        "RecordSourceName",
        "ProductIdentifier",
        "Barcode",
        "DescriptiveDetail",
        "CollateralDetail",
        "PromotionDetail",
        "ContentDetail",
        "PublishingDetail",
        "RelatedMaterial",
        "ProductSupply",
    ],
};

pub static DESCRIPTIVE_DETAIL: CompositeOrder = CompositeOrder {
    composite: "DescriptiveDetail",
    children: &[
        "ProductComposition",
        "ProductForm",
        "ProductFormDetail",
        "ProductFormFeature",
        "ProductPackaging",
        "ProductFormDescription",
        "TradeCategory",
        "PrimaryContentType",
        "ProductContentType",
        "Measure",
        "CountryOfManufacture",
        "EpubTechnicalProtection",
        "EpubUsageConstraint",
        "EpubLicense",
        "MapScale",
        "ProductClassification",
        "ProductPart",
        "Collection",
        "NoCollection",
        "TitleDetail",
        "ThesisType",
        "ThesisPresentedTo",
        "ThesisYear",
        "Contributor",
        "ContributorStatement",
        "NoContributor",
        "Event",
        "ReligiousText",
        "EditionType",
        "EditionNumber",
        "EditionVersionNumber",
        "EditionStatement",
        "NoEdition",
        "Language",
        "Extent",
        "Illustrated",
        "NumberOfIllustrations",
        "IllustrationsNote",
        "AncillaryContent",
        "Subject",
        "NameAsSubject",
        "AudienceCode",
        "Audience",
        "AudienceRange",
        "AudienceDescription",
        "Complexity",
    ],
};

pub static PRODUCT_FORM_FEATURE: CompositeOrder = CompositeOrder {
    composite: "ProductFormFeature",
    children: &[
        "ProductFormFeatureType",
        "ProductFormFeatureValue",
        "ProductFormFeatureDescription",
    ],
};

pub static TITLE_ELEMENT: CompositeOrder = CompositeOrder {
    composite: "TitleElement",
    children: &[
        "SequenceNumber",
        "TitleElementLevel",
        "PartNumber",
        "YearOfAnnual",
        "TitlePrefix",
        "NoPrefix",
        "TitleWithoutPrefix",
        "TitleText",
        "Subtitle",
    ],
};

pub static CONTRIBUTOR: CompositeOrder = CompositeOrder {
    composite: "Contributor",
    children: &[
        "SequenceNumber",
        "ContributorRole",
        "FromLanguage",
        "ToLanguage",
        "NameType",
        "NameIdentifier",
        "PersonName",
        "PersonNameInverted",
        "TitlesBeforeNames",
        "NamesBeforeKey",
        "PrefixToKey",
        "KeyNames",
        "NamesAfterKey",
        "SuffixToKey",
        "LettersAfterNames",
        "TitlesAfterNames",
        "Gender",
        "CorporateName",
        "CorporateNameInverted",
        "UnnamedPersons",
        "AlternativeName",
        "ContributorDate",
        "ProfessionalAffiliation",
        "Prize",
        "BiographicalNote",
        "Website",
        "ContributorDescription",
        "ContributorPlace",
    ],
};

pub static TEXT_CONTENT: CompositeOrder = CompositeOrder {
    composite: "TextContent",
    children: &[
        "TextType",
        "ContentAudience",
        "Territory",
        "Text",
        "ReviewRating",
        "TextAuthor",
        "TextSourceCorporate",
        "SourceTitle",
        "ContentDate",
    ],
};

pub static COLLATERAL_DETAIL: CompositeOrder = CompositeOrder {
    composite: "CollateralDetail",
    children: &["TextContent", "CitedContent", "SupportingResource", "Prize"],
};

pub static SUPPORTING_RESOURCE: CompositeOrder = CompositeOrder {
    composite: "SupportingResource",
    children: &[
        "ResourceContentType",
        "ContentAudience",
        "Territory",
        "ResourceMode",
        "ResourceFeature",
        "ResourceVersion",
    ],
};

pub static RESOURCE_VERSION: CompositeOrder = CompositeOrder {
    composite: "ResourceVersion",
    children: &[
        "ResourceForm",
        "ResourceVersionFeature",
        "ResourceLink",
        "ContentDate",
    ],
};

pub static PUBLISHING_DETAIL: CompositeOrder = CompositeOrder {
    composite: "PublishingDetail",
    children: &[
        "Imprint",
        "Publisher",
        "CityOfPublication",
        "CountryOfPublication",
        "ProductContact",
        "PublishingStatus",
        "PublishingStatusNote",
        "PublishingDate",
        "LatestReprintNumber",
        "CopyrightStatement",
        "SalesRights",
        "ROWSalesRightsType",
        "SalesRestriction",
    ],
};

pub static PUBLISHER: CompositeOrder = CompositeOrder {
    composite: "Publisher",
    children: &[
        "PublishingRole",
        "PublisherIdentifier",
        "PublisherName",
        "Funding",
        "Website",
    ],
};

pub static WEBSITE: CompositeOrder = CompositeOrder {
    composite: "Website",
    children: &["WebsiteRole", "WebsiteDescription", "WebsiteLink"],
};

pub static RELATED_MATERIAL: CompositeOrder = CompositeOrder {
    composite: "RelatedMaterial",
    children: &["RelatedWork", "RelatedProduct"],
};

pub static RELATED_WORK: CompositeOrder = CompositeOrder {
    composite: "RelatedWork",
    children: &["WorkRelationCode", "WorkIdentifier"],
};

pub static RELATED_PRODUCT: CompositeOrder = CompositeOrder {
    composite: "RelatedProduct",
    children: &[
        "ProductRelationCode",
        "ProductIdentifier",
        "ProductForm",
        "ProductFormDetail",
    ],
};

pub static PRODUCT_SUPPLY: CompositeOrder = CompositeOrder {
    composite: "ProductSupply",
    children: &["Market", "MarketPublishingDetail", "SupplyDetail"],
};

pub static SUPPLY_DETAIL: CompositeOrder = CompositeOrder {
    composite: "SupplyDetail",
    children: &[
        "Supplier",
        "SupplierOwnCoding",
        "ReturnsConditions",
        "ProductAvailability",
        "SupplyDate",
        "OrderTime",
        "NewSupplier",
        "Stock",
        "PackQuantity",
        "UnpricedItemType",
        "Price",
        "Reissue",
    ],
};

pub static SUPPLIER: CompositeOrder = CompositeOrder {
    composite: "Supplier",
    children: &[
        "SupplierRole",
        "SupplierIdentifier",
        "SupplierName",
        "TelephoneNumber",
        "FaxNumber",
        "EmailAddress",
        "Website",
    ],
};

/// Territory precedes every tax field.
pub static PRICE: CompositeOrder = CompositeOrder {
    composite: "Price",
    children: &[
        "PriceIdentifier",
        "PriceType",
        "PriceQualifier",
        "EpubTechnicalProtection",
        "PriceConstraint",
        "EpubLicense",
        "PriceTypeDescription",
        "PricePer",
        "PriceCondition",
        "MinimumOrderQuantity",
        "BatchBonus",
        "DiscountCoded",
        "Discount",
        "PriceStatus",
        "PriceAmount",
        "PriceCoded",
        "CurrencyCode",
        "Territory",
        "Tax",
        "TaxType",
        "TaxRatePercent",
        "TaxableAmount",
        "TaxAmount",
        "CurrencyZone",
        "ComparisonProductPrice",
        "PriceDate",
        "PrintedOnProduct",
        "PositionOnProduct",
    ],
};

pub static TAX: CompositeOrder = CompositeOrder {
    composite: "Tax",
    children: &[
        "ProductIdentifier",
        "PricePartDescription",
        "TaxType",
        "TaxRateCode",
        "TaxRatePercent",
        "TaxableAmount",
        "TaxAmount",
    ],
};

pub static TERRITORY: CompositeOrder = CompositeOrder {
    composite: "Territory",
    children: &[
        "CountriesIncluded",
        "RegionsIncluded",
        "CountriesExcluded",
        "RegionsExcluded",
    ],
};

static ALL: &[&CompositeOrder] = &[
    &HEADER,
    &SENDER,
    &PRODUCT,
    &DESCRIPTIVE_DETAIL,
    &PRODUCT_FORM_FEATURE,
    &TITLE_ELEMENT,
    &CONTRIBUTOR,
    &COLLATERAL_DETAIL,
    &TEXT_CONTENT,
    &SUPPORTING_RESOURCE,
    &RESOURCE_VERSION,
    &PUBLISHING_DETAIL,
    &PUBLISHER,
    &WEBSITE,
    &RELATED_MATERIAL,
    &RELATED_WORK,
    &RELATED_PRODUCT,
    &PRODUCT_SUPPLY,
    &SUPPLY_DETAIL,
    &SUPPLIER,
    &PRICE,
    &TAX,
    &TERRITORY,
];

/// The order table for a composite, if it has one.
pub fn order_for(composite: &str) -> Option<&'static CompositeOrder> {
    ALL.iter().copied().find(|order| order.composite == composite)
}

impl CompositeOrder {
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|&child| child == name)
    }

    pub fn allows(&self, name: &str) -> bool {
        self.rank(name).is_some()
    }

    /// Insert `child` after every existing child of equal or lower rank.
    ///
    /// Repeated children keep their insertion order. A child without a rank
    /// is appended.
    pub fn insert(&self, parent: &mut Element, child: Element) {
        let Some(rank) = self.rank(&child.name) else {
            parent.push(child);
            return;
        };
        let position = parent
            .children
            .iter()
            .rposition(|node| match node {
                Node::Element(el) => self.rank(&el.name).is_some_and(|r| r <= rank),
                Node::Text(_) => false,
            })
            .map_or(0, |i| i + 1);
        parent.children.insert(position, Node::Element(child));
    }

    /// Fail unless the ranked children of `el` appear in non-decreasing order.
    pub fn check(&self, el: &Element) -> Result<()> {
        let mut last: Option<(usize, &str)> = None;
        for child in el.elements() {
            let Some(rank) = self.rank(&child.name) else {
                continue;
            };
            if let Some((prev_rank, prev_name)) = last
                && rank < prev_rank
            {
                return Err(Error::Validation(format!(
                    "{}: {} must not follow {}",
                    self.composite, child.name, prev_name
                )));
            }
            last = Some((rank, &child.name));
        }
        Ok(())
    }
}
