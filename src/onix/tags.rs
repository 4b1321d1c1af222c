//! Short-tag to reference-tag names.
//!
//! Short-tag documents name data elements with codes (`a001`, `b244`) and
//! composites with the lower-cased reference name (`productidentifier`).

use super::tree::Element;

/// Data element codes used by ONIX 2.1 and 3.0 short-tag messages.
static SHORT_TAGS: &[(&str, &str)] = &[
    ("ONIXmessage", "ONIXMessage"),
    // Header
    ("m172", "FromEANNumber"),
    ("m173", "FromSAN"),
    ("m174", "FromCompany"),
    ("m175", "FromPerson"),
    ("m283", "FromEmail"),
    ("m176", "ToEANNumber"),
    ("m177", "ToSAN"),
    ("m178", "ToCompany"),
    ("m179", "ToPerson"),
    ("m180", "MessageNumber"),
    ("m181", "MessageRepeat"),
    ("m182", "SentDate"),
    ("m183", "MessageNote"),
    ("m184", "DefaultLanguageOfText"),
    ("m185", "DefaultPriceTypeCode"),
    ("m186", "DefaultCurrencyCode"),
    ("m187", "DefaultLinearUnit"),
    ("m188", "DefaultWeightUnit"),
    ("m193", "DefaultClassOfTrade"),
    ("x298", "SenderName"),
    ("x299", "ContactName"),
    ("x307", "SentDateTime"),
    ("x310", "DefaultPriceType"),
    // Record
    ("a001", "RecordReference"),
    ("a002", "NotificationType"),
    ("a194", "RecordSourceType"),
    ("a197", "RecordSourceName"),
    ("b221", "ProductIDType"),
    ("b233", "IDTypeName"),
    ("b244", "IDValue"),
    ("b201", "WorkIDType"),
    ("b246", "Barcode"),
    // Form
    ("x314", "ProductComposition"),
    ("b012", "ProductForm"),
    ("b333", "ProductFormDetail"),
    ("b334", "ProductFormFeatureType"),
    ("b335", "ProductFormFeatureValue"),
    ("b336", "ProductFormFeatureDescription"),
    ("b225", "ProductPackaging"),
    ("b014", "ProductFormDescription"),
    ("b384", "TradeCategory"),
    ("b211", "EpubType"),
    ("b212", "EpubTypeVersion"),
    ("b213", "EpubTypeDescription"),
    ("b214", "EpubFormat"),
    ("b215", "EpubFormatVersion"),
    ("b216", "EpubFormatDescription"),
    ("b277", "EpubTypeNote"),
    // Title and series
    ("b202", "TitleType"),
    ("x409", "TitleElementLevel"),
    ("b203", "TitleText"),
    ("b030", "TitlePrefix"),
    ("b031", "TitleWithoutPrefix"),
    ("b029", "Subtitle"),
    ("b018", "TitleOfSeries"),
    ("b019", "NumberWithinSeries"),
    // Contributor
    ("b034", "SequenceNumber"),
    ("b035", "ContributorRole"),
    ("b036", "PersonName"),
    ("b037", "PersonNameInverted"),
    ("b038", "TitlesBeforeNames"),
    ("b039", "NamesBeforeKey"),
    ("b247", "PrefixToKey"),
    ("b040", "KeyNames"),
    ("b041", "NamesAfterKey"),
    ("b248", "SuffixToKey"),
    ("b042", "LettersAfterNames"),
    ("b043", "TitlesAfterNames"),
    ("b047", "CorporateName"),
    ("b044", "BiographicalNote"),
    ("b390", "PersonNameIDType"),
    ("b049", "ContributorStatement"),
    ("n339", "NoContributor"),
    // Edition, language, extent
    ("b056", "EditionTypeCode"),
    ("b057", "EditionNumber"),
    ("b058", "EditionStatement"),
    ("n386", "NoEdition"),
    ("b253", "LanguageRole"),
    ("b252", "LanguageCode"),
    ("b061", "NumberOfPages"),
    ("b254", "PagesRoman"),
    ("b255", "PagesArabic"),
    ("b218", "ExtentType"),
    ("b219", "ExtentValue"),
    ("b220", "ExtentUnit"),
    ("b125", "NumberOfIllustrations"),
    ("b062", "IllustrationsNote"),
    ("b256", "IllustrationType"),
    ("b361", "IllustrationTypeDescription"),
    ("b257", "Number"),
    // Subject and audience
    ("b064", "BASICMainSubject"),
    ("b200", "BASICVersion"),
    ("b067", "SubjectSchemeIdentifier"),
    ("b171", "SubjectSchemeName"),
    ("b068", "SubjectSchemeVersion"),
    ("b069", "SubjectCode"),
    ("b070", "SubjectHeadingText"),
    ("b073", "AudienceCode"),
    ("b204", "AudienceCodeType"),
    ("b205", "AudienceCodeTypeName"),
    ("b206", "AudienceCodeValue"),
    ("b207", "AudienceDescription"),
    // Text and media
    ("d102", "TextTypeCode"),
    ("d103", "TextFormat"),
    ("d104", "Text"),
    ("d107", "TextAuthor"),
    ("d109", "TextPublicationDate"),
    ("x426", "TextType"),
    ("x427", "ContentAudience"),
    ("f114", "MediaFileTypeCode"),
    ("f115", "MediaFileFormatCode"),
    ("f116", "ImageResolution"),
    ("f117", "MediaFileLinkTypeCode"),
    ("f118", "MediaFileLink"),
    ("f119", "TextWithDownload"),
    ("x436", "ResourceContentType"),
    ("x437", "ResourceMode"),
    ("x441", "ResourceForm"),
    ("x435", "ResourceLink"),
    ("b367", "WebsiteRole"),
    ("f170", "ProductWebsiteDescription"),
    ("f123", "ProductWebsiteLink"),
    ("b294", "WebsiteDescription"),
    ("b295", "WebsiteLink"),
    // Publishing
    ("b079", "ImprintName"),
    ("b291", "PublishingRole"),
    ("b081", "PublisherName"),
    ("b209", "CityOfPublication"),
    ("b083", "CountryOfPublication"),
    ("b394", "PublishingStatus"),
    ("b395", "PublishingStatusNote"),
    ("b003", "PublicationDate"),
    ("x448", "PublishingDateRole"),
    ("b306", "Date"),
    ("b087", "CopyrightYear"),
    ("b089", "SalesRightsType"),
    ("b090", "RightsCountry"),
    ("b388", "RightsTerritory"),
    ("b091", "RightsRegion"),
    ("x449", "CountriesIncluded"),
    ("x450", "RegionsIncluded"),
    ("c093", "MeasureTypeCode"),
    ("c094", "Measurement"),
    ("c095", "MeasureUnitCode"),
    ("h208", "RelationCode"),
    // Supply
    ("j137", "SupplierName"),
    ("j292", "SupplierRole"),
    ("j272", "EmailAddress"),
    ("j138", "SupplyToCountry"),
    ("j269", "ReturnsCodeType"),
    ("j270", "ReturnsCode"),
    ("j141", "AvailabilityCode"),
    ("j396", "ProductAvailability"),
    ("j142", "ExpectedShipDate"),
    ("j143", "OnSaleDate"),
    ("j144", "OrderTime"),
    ("j145", "PackQuantity"),
    ("j350", "OnHand"),
    ("j351", "OnOrder"),
    ("j148", "PriceTypeCode"),
    ("j151", "PriceAmount"),
    ("j152", "CurrencyCode"),
    ("b251", "CountryCode"),
    ("j153", "TaxRateCode1"),
    ("j154", "TaxRatePercent1"),
    ("j155", "TaxableAmount1"),
    ("j156", "TaxAmount1"),
    ("j161", "PriceEffectiveFrom"),
    ("j162", "PriceEffectiveUntil"),
];

/// Composites, whose short tag is the lower-cased reference name.
static COMPOSITES: &[&str] = &[
    "Header",
    "Sender",
    "Product",
    "ProductIdentifier",
    "WorkIdentifier",
    "ProductFormFeature",
    "Title",
    "TitleDetail",
    "TitleElement",
    "Series",
    "Collection",
    "Contributor",
    "PersonNameIdentifier",
    "NameIdentifier",
    "Language",
    "Extent",
    "Illustrations",
    "AncillaryContent",
    "Subject",
    "MainSubject",
    "Audience",
    "OtherText",
    "TextContent",
    "MediaFile",
    "SupportingResource",
    "ResourceVersion",
    "ProductWebsite",
    "Website",
    "Imprint",
    "Publisher",
    "PublishingDate",
    "CopyrightStatement",
    "SalesRights",
    "SalesRestriction",
    "Measure",
    "RelatedProduct",
    "RelatedWork",
    "DescriptiveDetail",
    "CollateralDetail",
    "PublishingDetail",
    "RelatedMaterial",
    "ProductSupply",
    "Market",
    "Territory",
    "SupplyDetail",
    "Supplier",
    "ReturnsConditions",
    "SupplyDate",
    "ContentDate",
    "Stock",
    "Price",
];

/// Reference name for a short tag, if it is one.
pub fn reference_name(tag: &str) -> Option<&'static str> {
    if let Some((_, name)) = SHORT_TAGS.iter().find(|(short, _)| *short == tag) {
        return Some(name);
    }
    if !tag.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    COMPOSITES
        .iter()
        .copied()
        .find(|name| name.eq_ignore_ascii_case(tag))
}

/// Rename a short-tag document in place to reference tags.
///
/// Unknown short tags keep their names and are skipped by the builders.
pub fn expand_short_tags(root: &mut Element) {
    root.rename_all(&reference_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onix::tree::parse_document;

    #[test]
    fn test_reference_name() {
        assert_eq!(reference_name("a001"), Some("RecordReference"));
        assert_eq!(reference_name("productidentifier"), Some("ProductIdentifier"));
        assert_eq!(reference_name("ONIXmessage"), Some("ONIXMessage"));
        assert_eq!(reference_name("Product"), None);
        assert_eq!(reference_name("p"), None);
    }

    #[test]
    fn test_expand_document() {
        let mut root = parse_document(
            br#"<ONIXmessage><header><m174>Acme</m174></header>
<product><a001>ref</a001><productidentifier><b221>15</b221><b244>9781234567890</b244></productidentifier></product>
</ONIXmessage>"#,
        )
        .unwrap();
        expand_short_tags(&mut root);

        assert_eq!(root.name, "ONIXMessage");
        assert_eq!(
            root.child("Header").and_then(|h| h.child_text("FromCompany")).as_deref(),
            Some("Acme")
        );
        let product = root.child("Product").unwrap();
        assert_eq!(product.child_text("RecordReference").as_deref(), Some("ref"));
        let id = product.child("ProductIdentifier").unwrap();
        assert_eq!(id.child_text("IDValue").as_deref(), Some("9781234567890"));
    }

    #[test]
    fn test_codes_unique() {
        for (i, (short, _)) in SHORT_TAGS.iter().enumerate() {
            assert!(
                SHORT_TAGS[i + 1..].iter().all(|(other, _)| other != short),
                "duplicate short tag {short}"
            );
        }
    }
}
