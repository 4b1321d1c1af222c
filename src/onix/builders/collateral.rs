use tracing::debug;

use super::{Source, conform, put, put_opt};
use crate::onix::codes;
use crate::onix::order::{COLLATERAL_DETAIL, RESOURCE_VERSION, SUPPORTING_RESOURCE, TEXT_CONTENT};
use crate::onix::tree::Element;

/// `textformat` values shared by 2.1 `TextFormat` and the 3.0 attribute.
const TEXT_FORMATS: &[&str] = &["02", "03", "05", "06"];

/// `ContentAudience` for unrestricted content (List 154).
const ANY_AUDIENCE: &str = "00";

/// 2.1 product-level text fields that predate `OtherText`.
const DIRECT_TEXTS: &[(&str, &str)] = &[("Annotation", "02"), ("MainDescription", "03")];

fn content_date(role: &str, date: &str) -> Element {
    Element::new("ContentDate")
        .with_child(Element::leaf("ContentDateRole", role))
        .with_child(Element::leaf("Date", codes::normalize_date(date)))
}

/// 2.1 `OtherText` to `TextContent`.
fn text_content(other: &Element) -> Option<Element> {
    let Some(text) = other.child("Text") else {
        debug!("OtherText without inline Text skipped");
        return None;
    };
    let code = other.child_text("TextTypeCode").unwrap_or_default();
    let text_type = codes::text_type(&code).unwrap_or_else(|| {
        debug!(code, "Unmapped text type; using description");
        "03"
    });

    let mut content = Element::new("TextContent");
    put(&TEXT_CONTENT, &mut content, "TextType", text_type);
    put(&TEXT_CONTENT, &mut content, "ContentAudience", ANY_AUDIENCE);

    let mut text = text.clone();
    if let Some(format) = other.child_text("TextFormat")
        && TEXT_FORMATS.contains(&format.as_str())
    {
        text.set_attr("textformat", format);
    }
    TEXT_CONTENT.insert(&mut content, text);

    put_opt(&TEXT_CONTENT, &mut content, "TextAuthor", other.child_text("TextAuthor"));
    put_opt(&TEXT_CONTENT, &mut content, "SourceTitle", other.child_text("TextSourceTitle"));
    if let Some(date) = other.child_text("TextPublicationDate") {
        TEXT_CONTENT.insert(&mut content, content_date("01", &date));
    }
    Some(content)
}

/// 2.1 `MediaFile` to `SupportingResource`.
fn supporting_resource(media: &Element) -> Option<Element> {
    let Some(link) = media.child_text("MediaFileLink") else {
        debug!("MediaFile without link skipped");
        return None;
    };
    let code = media.child_text("MediaFileTypeCode").unwrap_or_default();
    let content_type = codes::resource_content_type(&code).unwrap_or_else(|| {
        debug!(code, "Unmapped media file type; using product image");
        "07"
    });

    let mut version = Element::new("ResourceVersion");
    put(&RESOURCE_VERSION, &mut version, "ResourceForm", "01");
    put(&RESOURCE_VERSION, &mut version, "ResourceLink", link);
    if let Some(date) = media.child_text("MediaFileDate") {
        RESOURCE_VERSION.insert(&mut version, content_date("17", &date));
    }

    let mut resource = Element::new("SupportingResource");
    put(&SUPPORTING_RESOURCE, &mut resource, "ResourceContentType", content_type);
    put(&SUPPORTING_RESOURCE, &mut resource, "ContentAudience", ANY_AUDIENCE);
    put(&SUPPORTING_RESOURCE, &mut resource, "ResourceMode", codes::resource_mode(&code));
    SUPPORTING_RESOURCE.insert(&mut resource, version);
    Some(resource)
}

/// Build `CollateralDetail`, or nothing when the record has no texts or resources.
pub fn build(src: Source) -> Option<Element> {
    let mut cd = Element::new("CollateralDetail");

    for content in src.all("TextContent") {
        let mut content = conform(content);
        if !content.has_child("ContentAudience") {
            put(&TEXT_CONTENT, &mut content, "ContentAudience", ANY_AUDIENCE);
        }
        COLLATERAL_DETAIL.insert(&mut cd, content);
    }
    for other in src.all("OtherText") {
        if let Some(content) = text_content(other) {
            COLLATERAL_DETAIL.insert(&mut cd, content);
        }
    }
    for (field, text_type) in DIRECT_TEXTS {
        if let Some(text) = src.text(field) {
            let mut content = Element::new("TextContent");
            put(&TEXT_CONTENT, &mut content, "TextType", *text_type);
            put(&TEXT_CONTENT, &mut content, "ContentAudience", ANY_AUDIENCE);
            put(&TEXT_CONTENT, &mut content, "Text", text);
            COLLATERAL_DETAIL.insert(&mut cd, content);
        }
    }

    for cited in src.all("CitedContent") {
        COLLATERAL_DETAIL.insert(&mut cd, conform(cited));
    }
    for resource in src.all("SupportingResource") {
        COLLATERAL_DETAIL.insert(&mut cd, conform(resource));
    }
    for media in src.all("MediaFile") {
        if let Some(resource) = supporting_resource(media) {
            COLLATERAL_DETAIL.insert(&mut cd, resource);
        }
    }

    cd.has_element_children().then_some(cd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onix::tree::parse_document;

    fn collateral(xml: &str) -> Option<Element> {
        let product = parse_document(xml.as_bytes()).unwrap();
        build(Source::new(&product))
    }

    #[test]
    fn test_empty_is_omitted() {
        assert!(collateral("<Product><RecordReference>x</RecordReference></Product>").is_none());
    }

    #[test]
    fn test_other_text() {
        let cd = collateral(
            "<Product><OtherText><TextTypeCode>99</TextTypeCode><TextFormat>02</TextFormat>\
<Text>&lt;p&gt;Blurb&lt;/p&gt;</Text><TextSourceTitle>The Times</TextSourceTitle>\
<TextPublicationDate>2021-04-02</TextPublicationDate></OtherText></Product>",
        )
        .unwrap();
        let content = cd.child("TextContent").unwrap();
        let names: Vec<&str> = content.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["TextType", "ContentAudience", "Text", "SourceTitle", "ContentDate"]);
        assert_eq!(content.child_text("TextType").as_deref(), Some("03"));
        let text = content.child("Text").unwrap();
        assert_eq!(text.attr("textformat"), Some("02"));
        assert_eq!(text.text(), "<p>Blurb</p>");
        assert_eq!(
            content.child("ContentDate").and_then(|d| d.child_text("Date")).as_deref(),
            Some("20210402")
        );
    }

    #[test]
    fn test_media_file_front_cover() {
        let cd = collateral(
            "<Product><MediaFile><MediaFileTypeCode>04</MediaFileTypeCode><MediaFileFormatCode>03</MediaFileFormatCode>\
<MediaFileLinkTypeCode>01</MediaFileLinkTypeCode><MediaFileLink>https://example.com/cover.jpg</MediaFileLink>\
<MediaFileDate>20200101</MediaFileDate></MediaFile></Product>",
        )
        .unwrap();
        let resource = cd.child("SupportingResource").unwrap();
        assert_eq!(resource.child_text("ResourceContentType").as_deref(), Some("01"));
        assert_eq!(resource.child_text("ResourceMode").as_deref(), Some("03"));
        let version = resource.child("ResourceVersion").unwrap();
        assert_eq!(version.child_text("ResourceLink").as_deref(), Some("https://example.com/cover.jpg"));
        assert!(version.has_child("ContentDate"));
    }

    #[test]
    fn test_media_file_without_link_skipped() {
        assert!(collateral("<Product><MediaFile><MediaFileTypeCode>04</MediaFileTypeCode></MediaFile></Product>").is_none());
    }

    #[test]
    fn test_texts_precede_resources() {
        let cd = collateral(
            "<Product><CollateralDetail><SupportingResource><ResourceContentType>01</ResourceContentType></SupportingResource>\
<TextContent><TextType>03</TextType><ContentAudience>00</ContentAudience><Text>x</Text></TextContent></CollateralDetail></Product>",
        )
        .unwrap();
        let names: Vec<&str> = cd.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["TextContent", "SupportingResource"]);
    }
}
