use tracing::debug;

use super::{Context, Source, conform, put};
use crate::codelist::FeatureCode;
use crate::onix::codes;
use crate::onix::order::{DESCRIPTIVE_DETAIL, TITLE_ELEMENT};
use crate::onix::tree::Element;

const DEFAULT_PRODUCT_COMPOSITION: &str = "00";
const DEFAULT_PRODUCT_FORM: &str = "EA";
const DEFAULT_EBOOK_FORM_DETAIL: &str = "E101";
const DEFAULT_LANGUAGE: &str = "eng";

/// `ProductFormFeatureType` for e-publication accessibility details (List 79).
pub const ACCESSIBILITY_FEATURE_TYPE: &str = "09";

/// Elements that carry over unchanged apart from 2.1 renames.
const CARRIED: &[&str] = &[
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
    "Contributor",
    "ContributorStatement",
    "NoContributor",
    "Event",
    "ReligiousText",
    "EditionType",
    "EditionTypeCode",
    "EditionNumber",
    "EditionVersionNumber",
    "EditionStatement",
    "NoEdition",
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
];

const EDITION_FIELDS: &[&str] = &[
    "EditionType",
    "EditionNumber",
    "EditionVersionNumber",
    "EditionStatement",
    "NoEdition",
];

fn feature(code: FeatureCode, description: String) -> Element {
    Element::new("ProductFormFeature")
        .with_child(Element::leaf("ProductFormFeatureType", ACCESSIBILITY_FEATURE_TYPE))
        .with_child(Element::leaf("ProductFormFeatureValue", code.to_string()))
        .with_child(Element::leaf("ProductFormFeatureDescription", description))
}

fn accessibility_features(ctx: &Context) -> Vec<Element> {
    ctx.features
        .iter()
        .map(|code| {
            let description = if code == FeatureCode::SUMMARY {
                ctx.features.summary_text()
            } else {
                code.description().to_string()
            };
            feature(code, description)
        })
        .collect()
}

fn title_element(level: &str, title: &Element) -> Element {
    let mut element = Element::new("TitleElement");
    put(&TITLE_ELEMENT, &mut element, "TitleElementLevel", level);
    match (title.child_text("TitlePrefix"), title.child_text("TitleWithoutPrefix")) {
        (Some(prefix), Some(rest)) => {
            put(&TITLE_ELEMENT, &mut element, "TitlePrefix", prefix);
            put(&TITLE_ELEMENT, &mut element, "TitleWithoutPrefix", rest);
        }
        _ => {
            if let Some(text) = title.child_text("TitleText") {
                put(&TITLE_ELEMENT, &mut element, "TitleText", text);
            }
        }
    }
    if let Some(subtitle) = title.child_text("Subtitle") {
        put(&TITLE_ELEMENT, &mut element, "Subtitle", subtitle);
    }
    element
}

/// 2.1 `Title` (or bare product-level title fields) to `TitleDetail`.
fn title_detail(title: &Element) -> Element {
    let title_type = title.child_text("TitleType").unwrap_or_else(|| "01".to_string());
    Element::new("TitleDetail")
        .with_child(Element::leaf("TitleType", title_type))
        .with_child(title_element("01", title))
}

/// 2.1 `Series` to a publisher collection.
fn collection(series: &Element) -> Element {
    let mut element = Element::new("TitleElement");
    put(&TITLE_ELEMENT, &mut element, "TitleElementLevel", "02");
    if let Some(number) = series.child_text("NumberWithinSeries") {
        put(&TITLE_ELEMENT, &mut element, "PartNumber", number);
    }
    let title = series
        .child_text("TitleOfSeries")
        .or_else(|| series.child("Title").and_then(|t| t.child_text("TitleText")));
    if let Some(title) = title {
        put(&TITLE_ELEMENT, &mut element, "TitleText", title);
    }
    Element::new("Collection")
        .with_child(Element::leaf("CollectionType", "10"))
        .with_child(
            Element::new("TitleDetail")
                .with_child(Element::leaf("TitleType", "01"))
                .with_child(element),
        )
}

/// 2.1 `Illustrations` to `AncillaryContent`.
fn ancillary_content(illustrations: &Element) -> Element {
    let content_type = match illustrations.child_text("IllustrationType").as_deref() {
        Some("01") => "01",
        Some("02") => "02",
        _ => "00",
    };
    let mut content = Element::new("AncillaryContent").with_child(Element::leaf("AncillaryContentType", content_type));
    if let Some(description) = illustrations.child_text("IllustrationTypeDescription") {
        content.push(Element::leaf("AncillaryContentDescription", description));
    }
    if let Some(number) = illustrations.child_text("Number") {
        content.push(Element::leaf("Number", number));
    }
    content
}

/// 2.1 `BASICMainSubject` or `MainSubject` to a main `Subject`.
fn main_subjects(src: Source) -> Vec<Element> {
    let mut subjects = Vec::new();
    for basic in src.all("BASICMainSubject") {
        let code = basic.text();
        if code.is_empty() {
            continue;
        }
        let mut subject = Element::new("Subject")
            .with_child(Element::new("MainSubject"))
            .with_child(Element::leaf("SubjectSchemeIdentifier", "10"));
        if let Some(version) = src.text("BASICVersion") {
            subject.push(Element::leaf("SubjectSchemeVersion", version));
        }
        subjects.push(subject.with_child(Element::leaf("SubjectCode", code)));
    }
    for main in src.all("MainSubject") {
        let Some(scheme) = main.child_text("MainSubjectSchemeIdentifier") else {
            continue;
        };
        let mut subject = Element::new("Subject")
            .with_child(Element::new("MainSubject"))
            .with_child(Element::leaf("SubjectSchemeIdentifier", scheme));
        for field in ["SubjectSchemeVersion", "SubjectCode", "SubjectHeadingText"] {
            if let Some(value) = main.child_text(field) {
                subject.push(Element::leaf(field, value));
            }
        }
        subjects.push(subject);
    }
    subjects
}

fn language(code: &str) -> Element {
    Element::new("Language")
        .with_child(Element::leaf("LanguageRole", "01"))
        .with_child(Element::leaf("LanguageCode", code))
}

/// Languages: the override replaces the primary language, otherwise legacy
/// entries carry over, otherwise the header default (or English).
fn languages(src: Source, ctx: &Context) -> Vec<Element> {
    let legacy = src.all("Language");
    if let Some(code) = ctx.overriding(|p| p.language_code.as_ref()) {
        let mut out = vec![language(&code)];
        out.extend(
            legacy
                .into_iter()
                .filter(|l| l.child_text("LanguageRole").as_deref() != Some("01"))
                .map(conform),
        );
        return out;
    }
    if !legacy.is_empty() {
        return legacy.into_iter().map(conform).collect();
    }
    let code = ctx
        .default_language()
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    vec![language(&code)]
}

/// Build `DescriptiveDetail` with accessibility features injected.
pub fn build(src: Source, ctx: &Context) -> Element {
    let mut dd = Element::new("DescriptiveDetail");
    let add = |dd: &mut Element, el: Element| DESCRIPTIVE_DETAIL.insert(dd, el);

    let composition = ctx
        .overriding(|p| p.product_composition.as_ref())
        .or_else(|| src.text("ProductComposition"))
        .unwrap_or_else(|| DEFAULT_PRODUCT_COMPOSITION.to_string());
    put(&DESCRIPTIVE_DETAIL, &mut dd, "ProductComposition", composition);

    let form = ctx
        .overriding(|p| p.product_form.as_ref())
        .or_else(|| src.text("ProductForm").map(|f| codes::product_form(&f)))
        .unwrap_or_else(|| DEFAULT_PRODUCT_FORM.to_string());

    let mut details: Vec<String> = Vec::new();
    for detail in src.all("ProductFormDetail").into_iter().map(Element::text) {
        if !detail.is_empty() && !details.contains(&detail) {
            details.push(detail);
        }
    }
    if details.is_empty() {
        if let Some(epub_type) = src.text("EpubType") {
            details.push(codes::epub_type_form_detail(&epub_type).to_string());
        } else if form.starts_with('E') {
            details.push(DEFAULT_EBOOK_FORM_DETAIL.to_string());
        }
    }
    put(&DESCRIPTIVE_DETAIL, &mut dd, "ProductForm", form);
    for detail in details {
        put(&DESCRIPTIVE_DETAIL, &mut dd, "ProductFormDetail", detail);
    }

    // Accessibility entries lead the features; legacy ones of the same type are replaced
    for el in accessibility_features(ctx) {
        add(&mut dd, el);
    }
    for legacy in src.all("ProductFormFeature") {
        if legacy.child_text("ProductFormFeatureType").as_deref() == Some(ACCESSIBILITY_FEATURE_TYPE) {
            debug!("Legacy accessibility feature replaced");
            continue;
        }
        add(&mut dd, conform(legacy));
    }

    for name in CARRIED {
        for el in src.all(name) {
            add(&mut dd, conform(el));
        }
    }

    if !dd.has_child("TitleDetail") {
        let titles = src.all("Title");
        if titles.is_empty() {
            // Bare title fields directly under a 2.1 product
            if src.text("TitleText").is_some() || src.text("DistinctiveTitle").is_some() {
                let mut bare = Element::new("Title");
                for field in ["TitleText", "TitlePrefix", "TitleWithoutPrefix", "Subtitle"] {
                    if let Some(value) = src.text(field) {
                        bare.push(Element::leaf(field, value));
                    }
                }
                if !bare.has_child("TitleText")
                    && let Some(distinctive) = src.text("DistinctiveTitle")
                {
                    bare.push(Element::leaf("TitleText", distinctive));
                }
                add(&mut dd, title_detail(&bare));
            }
        } else {
            for title in titles {
                add(&mut dd, title_detail(title));
            }
        }
    }

    for series in src.all("Series") {
        add(&mut dd, collection(series));
    }

    if let Some(pages) = src.text("NumberOfPages") {
        let extent = Element::new("Extent")
            .with_child(Element::leaf("ExtentType", "00"))
            .with_child(Element::leaf("ExtentValue", pages))
            .with_child(Element::leaf("ExtentUnit", "03"));
        add(&mut dd, extent);
    }

    for illustrations in src.all("Illustrations") {
        add(&mut dd, ancillary_content(illustrations));
    }

    for subject in main_subjects(src) {
        add(&mut dd, subject);
    }

    for el in languages(src, ctx) {
        add(&mut dd, el);
    }

    if !EDITION_FIELDS.iter().any(|name| dd.has_child(name)) {
        add(&mut dd, Element::new("NoEdition"));
    }

    dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::FeatureSet;
    use crate::onix::publisher::PublisherOverride;
    use crate::onix::tree::parse_document;

    fn build_from(xml: &str, features: &FeatureSet, publisher: Option<&PublisherOverride>) -> Element {
        let product = parse_document(xml.as_bytes()).unwrap();
        let ctx = Context {
            features,
            isbn: "9781234567890",
            publisher,
            header: None,
            sender_name: "Sender",
        };
        build(Source::new(&product), &ctx)
    }

    fn names(el: &Element) -> Vec<&str> {
        el.elements().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_defaults_on_empty_product() {
        let dd = build_from("<Product/>", &FeatureSet::new(), None);
        assert_eq!(
            names(&dd),
            vec!["ProductComposition", "ProductForm", "ProductFormDetail", "NoEdition", "Language"]
        );
        assert_eq!(dd.child_text("ProductComposition").as_deref(), Some("00"));
        assert_eq!(dd.child_text("ProductForm").as_deref(), Some("EA"));
        assert_eq!(dd.child_text("ProductFormDetail").as_deref(), Some("E101"));
        assert!(DESCRIPTIVE_DETAIL.check(&dd).is_ok());
    }

    #[test]
    fn test_features_injected_before_legacy_features() {
        let features = FeatureSet::from_codes(["36", "11", "13"]).unwrap();
        let dd = build_from(
            "<Product><ProductForm>DG</ProductForm><EpubType>029</EpubType>\
<ProductFormFeature><ProductFormFeatureType>09</ProductFormFeatureType><ProductFormFeatureValue>22</ProductFormFeatureValue></ProductFormFeature>\
<ProductFormFeature><ProductFormFeatureType>12</ProductFormFeatureType><ProductFormFeatureValue>00</ProductFormFeatureValue></ProductFormFeature>\
</Product>",
            &features,
            None,
        );
        assert_eq!(dd.child_text("ProductForm").as_deref(), Some("EA"));
        assert_eq!(dd.child_text("ProductFormDetail").as_deref(), Some("E101"));

        let feats: Vec<(String, String)> = dd
            .children_named("ProductFormFeature")
            .map(|f| {
                (
                    f.child_text("ProductFormFeatureType").unwrap_or_default(),
                    f.child_text("ProductFormFeatureValue").unwrap_or_default(),
                )
            })
            .collect();
        let expected: Vec<(String, String)> = [("09", "11"), ("09", "13"), ("09", "36"), ("12", "00")]
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        assert_eq!(feats, expected);
    }

    #[test]
    fn test_summary_description() {
        let mut features = FeatureSet::from_codes(["00"]).unwrap();
        features.set_summary("Fully accessible.");
        let dd = build_from("<Product/>", &features, None);
        let f = dd.child("ProductFormFeature").unwrap();
        assert_eq!(f.child_text("ProductFormFeatureValue").as_deref(), Some("00"));
        assert_eq!(f.child_text("ProductFormFeatureDescription").as_deref(), Some("Fully accessible."));
    }

    #[test]
    fn test_existing_30_not_duplicated() {
        let dd = build_from(
            "<Product><DescriptiveDetail><ProductComposition>00</ProductComposition><ProductForm>ED</ProductForm>\
<ProductFormDetail>E101</ProductFormDetail><TitleDetail><TitleType>01</TitleType></TitleDetail>\
<Language><LanguageRole>01</LanguageRole><LanguageCode>ger</LanguageCode></Language>\
<EditionNumber>2</EditionNumber></DescriptiveDetail></Product>",
            &FeatureSet::new(),
            None,
        );
        assert_eq!(dd.children_named("ProductComposition").count(), 1);
        assert_eq!(dd.children_named("ProductForm").count(), 1);
        assert_eq!(dd.children_named("TitleDetail").count(), 1);
        assert_eq!(dd.children_named("Language").count(), 1);
        assert!(!dd.has_child("NoEdition"));
        assert_eq!(dd.child_text("ProductForm").as_deref(), Some("ED"));
    }

    #[test]
    fn test_override_precedence() {
        let publisher = PublisherOverride {
            product_composition: Some("10".into()),
            product_form: Some("EB".into()),
            language_code: Some("fre".into()),
            ..Default::default()
        };
        let dd = build_from(
            "<Product><ProductForm>DG</ProductForm>\
<Language><LanguageRole>01</LanguageRole><LanguageCode>eng</LanguageCode></Language>\
<Language><LanguageRole>02</LanguageRole><LanguageCode>ger</LanguageCode></Language></Product>",
            &FeatureSet::new(),
            Some(&publisher),
        );
        assert_eq!(dd.child_text("ProductComposition").as_deref(), Some("10"));
        assert_eq!(dd.child_text("ProductForm").as_deref(), Some("EB"));
        let langs: Vec<String> = dd
            .children_named("Language")
            .filter_map(|l| l.child_text("LanguageCode"))
            .collect();
        assert_eq!(langs, vec!["fre", "ger"]);
    }

    #[test]
    fn test_legacy_21_conversions() {
        let dd = build_from(
            "<Product>\
<Title><TitleType>01</TitleType><TitleText>The Book</TitleText><Subtitle>A Story</Subtitle></Title>\
<Series><TitleOfSeries>Saga</TitleOfSeries><NumberWithinSeries>3</NumberWithinSeries></Series>\
<Contributor><SequenceNumber>1</SequenceNumber><ContributorRole>A01</ContributorRole><PersonName>Ann Author</PersonName></Contributor>\
<EditionTypeCode>REV</EditionTypeCode>\
<NumberOfPages>320</NumberOfPages>\
<Illustrations><IllustrationType>02</IllustrationType><Number>12</Number></Illustrations>\
<BASICMainSubject>FIC000000</BASICMainSubject><BASICVersion>2023</BASICVersion>\
</Product>",
            &FeatureSet::new(),
            None,
        );
        assert_eq!(
            names(&dd),
            vec![
                "ProductComposition",
                "ProductForm",
                "ProductFormDetail",
                "Collection",
                "TitleDetail",
                "Contributor",
                "EditionType",
                "Language",
                "Extent",
                "AncillaryContent",
                "Subject",
            ]
        );
        let title = dd.child("TitleDetail").and_then(|t| t.child("TitleElement")).unwrap();
        assert_eq!(title.child_text("TitleText").as_deref(), Some("The Book"));
        assert_eq!(title.child_text("Subtitle").as_deref(), Some("A Story"));

        let series = dd.find("TitleElement").unwrap();
        assert_eq!(series.child_text("TitleElementLevel").as_deref(), Some("02"));
        assert_eq!(series.child_text("PartNumber").as_deref(), Some("3"));

        let extent = dd.child("Extent").unwrap();
        assert_eq!(extent.child_text("ExtentValue").as_deref(), Some("320"));
        assert_eq!(extent.child_text("ExtentUnit").as_deref(), Some("03"));

        let subject = dd.child("Subject").unwrap();
        assert!(subject.has_child("MainSubject"));
        assert_eq!(subject.child_text("SubjectCode").as_deref(), Some("FIC000000"));
        assert!(DESCRIPTIVE_DETAIL.check(&dd).is_ok());
    }
}
