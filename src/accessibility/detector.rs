use std::io::{Read, Seek};

use memchr::memmem;
use tracing::{debug, info, warn};

use super::metadata::{apply_entry, parse_opf_metadata};
use super::package::{Package, resolve_href};
use super::stylesheet::declares_readability_properties;
use super::{FeatureSet, infer_conformance};
use crate::codelist::FeatureCode;
use crate::error::Result;
use crate::patterns::LANG_ATTR_RE;

const CONTENT_SUFFIXES: &[&str] = &[".xhtml", ".html", ".htm", ".xml"];
const PAGE_SUFFIXES: &[&str] = &[".xhtml", ".html", ".htm"];

const PAGEBREAK_MARKERS: &[&[u8]] = &[
    br#"epub:type="pagebreak""#,
    br#"epub:type='pagebreak'"#,
    br#"role="doc-pagebreak""#,
    br#"role='doc-pagebreak'"#,
];

const LANDMARK_MARKERS: &[&[u8]] = &[br#"epub:type="landmarks""#, br#"epub:type='landmarks'"#];

fn contains_any(haystack: &[u8], needles: &[&[u8]]) -> bool {
    needles
        .iter()
        .any(|needle| memmem::find(haystack, needle).is_some())
}

/// Detect accessibility features in an EPUB package.
///
/// Fails with [`Error::MalformedPackage`](crate::Error::MalformedPackage)
/// when the archive cannot be opened or has no package document. Unreadable
/// individual entries are logged and skipped.
pub fn detect<R: Read + Seek>(reader: R) -> Result<FeatureSet> {
    let mut package = Package::open(reader)?;
    let mut features = FeatureSet::new();

    // 1. Language tagging in any content document
    for name in package.names_with_suffix(CONTENT_SUFFIXES) {
        let text = match package.read_text(&name) {
            Ok(text) => text,
            Err(e) => {
                warn!(entry = %name, error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if let Some(caps) = LANG_ATTR_RE.captures(&text) {
            info!(entry = %name, lang = &caps[1], "Language tagging detected");
            features.insert(FeatureCode::LANGUAGE_TAGGING);
            break;
        }
    }

    // 2. Package metadata
    let opf_path = package.find_opf_path()?;
    info!(path = %opf_path, "Package document found");
    let opf_bytes = package.read_bytes(&opf_path)?;
    let opf_text = package.read_text(&opf_path)?;
    let opf = parse_opf_metadata(&opf_text)?;
    debug!(entries = opf.entries.len(), "Package metadata parsed");

    for entry in &opf.entries {
        apply_entry(entry, &mut features);
    }

    // 3. Page break markers
    for name in package.names_with_suffix(PAGE_SUFFIXES) {
        if let Ok(bytes) = package.read_bytes(&name)
            && contains_any(&bytes, PAGEBREAK_MARKERS)
        {
            info!(entry = %name, "Print-equivalent page numbering detected (pagebreak markers)");
            features.insert(FeatureCode::PAGE_NUMBERING);
            break;
        }
    }

    // 4. Landmarks in the guide, package document, or navigation document
    let mut landmarks = opf.has_guide || contains_any(&opf_bytes, LANDMARK_MARKERS);
    if !landmarks && let Some(nav_href) = &opf.nav_href {
        let nav_path = resolve_href(&opf_path, nav_href);
        match package.read_bytes(&nav_path) {
            Ok(nav) => landmarks = contains_any(&nav, LANDMARK_MARKERS),
            Err(e) => warn!(entry = %nav_path, error = %e, "Navigation document unreadable"),
        }
    }
    if landmarks {
        info!("Landmark navigation detected");
        features.insert(FeatureCode::LANDMARKS);
    }

    // 5. Readability-related stylesheet properties
    for name in package.names_with_suffix(&[".css"]) {
        if let Ok(css) = package.read_text(&name)
            && declares_readability_properties(&css)
        {
            info!(entry = %name, "Stylesheet properties supporting readability detected");
            features.insert(FeatureCode::DYSLEXIA_READABILITY);
            break;
        }
    }

    // 6. Nothing in a package can disable reading system options
    features.insert(FeatureCode::NO_OPTIONS_DISABLED);

    // 7. Compliance inference
    infer_conformance(&mut features);

    info!(
        codes = %features.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(","),
        "Accessibility analysis complete"
    );
    Ok(features)
}
