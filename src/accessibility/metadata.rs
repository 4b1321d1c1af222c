//! Package document metadata and the accessibility heuristics applied to it.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, warn};

use super::FeatureSet;
use super::conformance::parse_conformance;
use crate::codelist::FeatureCode;
use crate::error::{Error, Result};
use crate::util::{local_name, resolve_entity, unescape_attr};

/// One `<metadata>` child: `property`/`name`/`rel` paired with its text,
/// `content`, or `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub property: String,
    pub value: String,
}

impl MetaEntry {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// What the detector needs from the package document.
#[derive(Debug, Clone, Default)]
pub struct OpfMetadata {
    pub entries: Vec<MetaEntry>,
    /// Manifest href of the EPUB 3 navigation document.
    pub nav_href: Option<String>,
    /// EPUB 2 `<guide>` present.
    pub has_guide: bool,
}

/// Free-text `accessibilityFeature` values and the codes they declare.
const FEATURE_KEYWORDS: &[(&str, FeatureCode)] = &[
    ("tableofcontents", FeatureCode::TABLE_OF_CONTENTS),
    ("index", FeatureCode::INDEX),
    ("readingorder", FeatureCode::READING_ORDER),
    ("alternativetext", FeatureCode::SHORT_ALT_TEXT),
    ("longdescription", FeatureCode::FULL_ALT_TEXT),
    ("alternativerepresentation", FeatureCode::NON_GRAPHICAL_DATA),
    ("mathml", FeatureCode::MATHML),
    ("chemml", FeatureCode::CHEMML),
    ("printpagenumbers", FeatureCode::PAGE_NUMBERING),
    ("pagenumbers", FeatureCode::PAGE_NUMBERING),
    ("pagebreaks", FeatureCode::PAGE_NUMBERING),
    ("synchronizedaudiotext", FeatureCode::SYNCHRONIZED_AUDIO),
    ("ttsmarkup", FeatureCode::TTS_HINTING),
    ("displaytransformability", FeatureCode::DYSLEXIA_READABILITY),
    ("fontcustomization", FeatureCode::DYSLEXIA_READABILITY),
    ("textspacing", FeatureCode::DYSLEXIA_READABILITY),
    ("colorcustomization", FeatureCode::DYSLEXIA_READABILITY),
    ("texttospeech", FeatureCode::DYSLEXIA_READABILITY),
    ("readingtools", FeatureCode::DYSLEXIA_READABILITY),
    ("highcontrast", FeatureCode::HIGH_CONTRAST),
    ("colorcontrast", FeatureCode::HIGH_CONTRAST),
    ("audiocontrast", FeatureCode::AUDIO_CONTRAST),
    ("fullaudiodescription", FeatureCode::FULL_AUDIO_DESCRIPTION),
    ("structuralnavigation", FeatureCode::STRUCTURAL_NAVIGATION),
    ("aria", FeatureCode::ARIA),
    ("accessibleinterface", FeatureCode::ACCESSIBLE_CONTROLS),
    ("accessiblecontrols", FeatureCode::ACCESSIBLE_CONTROLS),
    ("accessiblenavigation", FeatureCode::ACCESSIBLE_CONTROLS),
    ("landmarks", FeatureCode::LANDMARKS),
    ("landmarknavigation", FeatureCode::LANDMARKS),
    ("chemistryml", FeatureCode::CHEMISTRY_MATHML),
    ("latex", FeatureCode::LATEX),
    ("modifiabletextsize", FeatureCode::MODIFIABLE_TEXT),
    ("ultracolorcontrast", FeatureCode::ULTRA_HIGH_CONTRAST),
    ("glossary", FeatureCode::GLOSSARY),
    ("accessiblesupplementarycontent", FeatureCode::ACCESSIBLE_SUPPLEMENT),
    ("linkpurpose", FeatureCode::LINK_PURPOSE),
];

fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| unescape_attr(&String::from_utf8_lossy(&attr.value)))
}

/// Property name and attribute-carried value of a metadata element.
fn entry_head(e: &BytesStart) -> (Option<String>, Option<String>) {
    let is_link = local_name(e.name().as_ref()) == b"link";
    let property = attr_string(e, b"property")
        .or_else(|| attr_string(e, b"name"))
        .or_else(|| if is_link { attr_string(e, b"rel") } else { None });
    let value = attr_string(e, b"content").or_else(|| {
        if is_link {
            attr_string(e, b"href")
        } else {
            None
        }
    });
    (property, value)
}

/// Parse the package document's metadata block and manifest hints.
pub fn parse_opf_metadata(content: &str) -> Result<OpfMetadata> {
    // Text is trimmed per entry; trimming events would drop spaces around entities
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut opf = OpfMetadata::default();
    let mut in_metadata = false;
    let mut saw_package = false;
    // (property, attribute value, text buffer) of the open metadata child
    let mut current: Option<(Option<String>, Option<String>, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_package = true;
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"metadata" => in_metadata = true,
                    b"guide" => opf.has_guide = true,
                    _ if in_metadata => {
                        let (property, value) = entry_head(&e);
                        current = Some((property, value, String::new()));
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                saw_package = true;
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"guide" => opf.has_guide = true,
                    b"item" => {
                        let is_nav = attr_string(&e, b"properties")
                            .is_some_and(|p| p.split_whitespace().any(|t| t == "nav"));
                        if is_nav {
                            opf.nav_href = attr_string(&e, b"href");
                        }
                    }
                    _ if in_metadata => {
                        if let (Some(property), Some(value)) = entry_head(&e) {
                            push_entry(&mut opf.entries, property, value);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((_, _, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some((_, _, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some((_, _, text)) = current.as_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"metadata" {
                    in_metadata = false;
                    current = None;
                } else if let Some((property, attr_value, text)) = current.take() {
                    let text = text.trim();
                    let value = if text.is_empty() {
                        attr_value
                    } else {
                        Some(text.to_string())
                    };
                    if let (Some(property), Some(value)) = (property, value) {
                        push_entry(&mut opf.entries, property, value);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::MalformedPackage(format!(
                    "package document is not well-formed: {e}"
                )));
            }
            _ => {}
        }
    }

    if !saw_package {
        return Err(Error::MalformedPackage("package document is empty".into()));
    }

    Ok(opf)
}

fn push_entry(entries: &mut Vec<MetaEntry>, property: String, value: String) {
    if property.is_empty() || value.trim().is_empty() {
        return;
    }
    debug!(property, value, "metadata entry");
    entries.push(MetaEntry::new(property, value.trim()));
}

/// Apply every metadata heuristic to one entry.
pub fn apply_entry(entry: &MetaEntry, features: &mut FeatureSet) {
    let property = entry.property.to_lowercase();
    let value = entry.value.to_lowercase();

    if property == "dcterms:modified" {
        match chrono::NaiveDateTime::parse_from_str(entry.value.trim(), "%Y-%m-%dT%H:%M:%SZ") {
            Ok(_) => {
                features.insert(FeatureCode::ASSESSMENT_DATE);
                info!("Latest accessibility assessment date detected");
            }
            Err(_) => warn!(value = %entry.value, "Unable to parse dcterms:modified date"),
        }
        return;
    }

    if property.contains("conformsto") {
        parse_conformance(&value, features);
    }

    if property.contains("accessibility-summary") || property.contains("accessibilitysummary") {
        features.insert(FeatureCode::SUMMARY);
        features.set_summary(entry.value.as_str());
        info!("Accessibility summary detected");
    }

    if property.contains("accessibilityfeature") {
        for &(keyword, code) in FEATURE_KEYWORDS {
            if value.contains(keyword) && features.insert(code) {
                info!(code = %code, "Accessibility feature detected: {}", code.description());
            }
        }
    }

    let mut heuristic = |code: FeatureCode, label: &str| {
        if features.insert(code) {
            info!(code = %code, "{label}");
        }
    };

    if value.contains("pdf/ua") {
        heuristic(FeatureCode::PDF_UA, "PDF/UA detected");
    }
    if ["dyslexia", "readability", "customizable"]
        .iter()
        .any(|key| value.contains(key))
    {
        heuristic(FeatureCode::DYSLEXIA_READABILITY, "Dyslexia readability features detected");
    }
    if value.contains("page-list") || value.contains("page-map") {
        heuristic(FeatureCode::PAGE_NUMBERING, "Print-equivalent page numbering detected");
    }
    if value.contains("contrast") && (value.contains("high") || value.contains("enhanced")) {
        heuristic(FeatureCode::HIGH_CONTRAST, "High contrast detected");
    }
    if value.contains("controls") && value.contains("accessible") {
        heuristic(FeatureCode::ACCESSIBLE_CONTROLS, "Accessible controls detected");
    }
    if property.contains("accessibilityhazard") && value.contains("none") {
        heuristic(FeatureCode::MODIFIABLE_TEXT, "No accessibility hazards declared");
    }
    if property.contains("certifiedby") {
        heuristic(FeatureCode::CERTIFIED_BY, "Compliance certification detected");
    }
    if property.contains("accessibilityapi")
        || property.contains("certifierreport")
        || (property.contains("accessibility") && value.starts_with("http"))
    {
        heuristic(FeatureCode::COMPLIANCE_WEB_PAGE, "Compliance web page detected");
    }
    if property.contains("accessmode") {
        if value.contains("textual") {
            heuristic(FeatureCode::SIGHT_FREE_READING, "Content readable without sight");
        }
        if value.contains("auditory") {
            heuristic(FeatureCode::AUDIO_READING, "Content readable via pre-recorded audio");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Accessible Book</dc:title>
    <meta property="dcterms:modified">2024-05-01T09:30:00Z</meta>
    <meta property="schema:accessibilityFeature">tableOfContents</meta>
    <meta property="schema:accessibilityFeature">readingOrder</meta>
    <meta property="schema:accessibilityHazard">none</meta>
    <meta property="schema:accessibilitySummary">Navigable &amp; reflowable.</meta>
    <meta name="schema:accessMode" content="textual"/>
    <link rel="a11y:certifierReport" href="https://example.com/report"/>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine><itemref idref="c1"/></spine>
</package>"#;

    fn apply_all(entries: &[MetaEntry]) -> FeatureSet {
        let mut set = FeatureSet::new();
        for entry in entries {
            apply_entry(entry, &mut set);
        }
        set
    }

    #[test]
    fn test_parse_entries() {
        let opf = parse_opf_metadata(OPF).unwrap();
        assert_eq!(opf.nav_href.as_deref(), Some("nav.xhtml"));
        assert!(!opf.has_guide);

        let props: Vec<&str> = opf.entries.iter().map(|e| e.property.as_str()).collect();
        assert_eq!(
            props,
            vec![
                "dcterms:modified",
                "schema:accessibilityFeature",
                "schema:accessibilityFeature",
                "schema:accessibilityHazard",
                "schema:accessibilitySummary",
                "schema:accessMode",
                "a11y:certifierReport",
            ]
        );
        assert_eq!(opf.entries[4].value, "Navigable & reflowable.");
        assert_eq!(opf.entries[5].value, "textual");
        assert_eq!(opf.entries[6].value, "https://example.com/report");
    }

    #[test]
    fn test_apply_entries() {
        let opf = parse_opf_metadata(OPF).unwrap();
        let set = apply_all(&opf.entries);
        let codes: Vec<u8> = set.iter().map(FeatureCode::value).collect();
        assert_eq!(codes, vec![0, 11, 13, 36, 52, 91, 94]);
        assert_eq!(set.summary(), Some("Navigable & reflowable."));
    }

    #[test]
    fn test_guide_detected() {
        let opf = parse_opf_metadata(
            r#"<package><metadata/><guide><reference type="toc" href="toc.html"/></guide></package>"#,
        )
        .unwrap();
        assert!(opf.has_guide);
    }

    #[test]
    fn test_value_heuristics_apply_to_any_property() {
        let set = apply_all(&[MetaEntry::new(
            "dc:description",
            "PDF/UA tagged, high contrast, page-list, customizable",
        )]);
        let codes: Vec<u8> = set.iter().map(FeatureCode::value).collect();
        assert_eq!(codes, vec![5, 19, 24, 26]);

        let set = apply_all(&[
            MetaEntry::new("dc:description", "Dyslexia friendly, accessible controls"),
            MetaEntry::new("schema:accessibilityFeature", "enhanced contrast"),
        ]);
        let codes: Vec<u8> = set.iter().map(FeatureCode::value).collect();
        assert_eq!(codes, vec![24, 26, 31]);
    }

    #[test]
    fn test_property_checks_need_matching_property() {
        let set = apply_all(&[
            MetaEntry::new("dc:description", "none"),
            MetaEntry::new("dc:subject", "textual"),
        ]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_feature_keywords() {
        let set = apply_all(&[
            MetaEntry::new("schema:accessibilityFeature", "printPageNumbers"),
            MetaEntry::new("schema:accessibilityFeature", "MathML"),
            MetaEntry::new("schema:accessibilityFeature", "ARIA"),
            MetaEntry::new("schema:accessibilityFeature", "displayTransformability"),
        ]);
        assert!(set.contains(FeatureCode::PAGE_NUMBERING));
        assert!(set.contains(FeatureCode::MATHML));
        assert!(set.contains(FeatureCode::ARIA));
        assert!(set.contains(FeatureCode::DYSLEXIA_READABILITY));
    }

    #[test]
    fn test_conformance_and_certification() {
        let set = apply_all(&[
            MetaEntry::new("dcterms:conformsTo", "EPUB-A11Y-11_WCAG-21-AA"),
            MetaEntry::new("a11y:certifiedBy", "Accessibility Testing Co"),
            MetaEntry::new("schema:accessModeSufficient", "auditory"),
        ]);
        assert!(set.contains(FeatureCode::EPUB_A11Y_11));
        assert!(set.contains(FeatureCode::CERTIFIED_BY));
        assert!(set.contains(FeatureCode::AUDIO_READING));
        assert!(set.contains(FeatureCode::WCAG_AA));
        assert!(set.contains(FeatureCode::WCAG_21));
    }

    #[test]
    fn test_bad_modified_date() {
        let set = apply_all(&[MetaEntry::new("dcterms:modified", "May 2024")]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_malformed_opf() {
        assert!(matches!(
            parse_opf_metadata(""),
            Err(Error::MalformedPackage(_))
        ));
        assert!(matches!(
            parse_opf_metadata("<package><metadata></package>"),
            Err(Error::MalformedPackage(_))
        ));
    }
}
