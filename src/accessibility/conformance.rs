//! Conformance statements and compliance inference.
//!
//! Each conformance level implies the levels below it: EPUB Accessibility
//! 1.1 implies 1.0 AA implies 1.0 A, WCAG AAA implies AA implies A, and
//! WCAG 2.2 implies 2.1 implies 2.0.

use tracing::info;

use super::FeatureSet;
use crate::codelist::FeatureCode;

const EPUB_11: &[FeatureCode] = &[
    FeatureCode::EPUB_A11Y_11,
    FeatureCode::EPUB_A11Y_10_AA,
    FeatureCode::EPUB_A11Y_10_A,
];
const EPUB_10_AA: &[FeatureCode] = &[FeatureCode::EPUB_A11Y_10_AA, FeatureCode::EPUB_A11Y_10_A];
const EPUB_10_A: &[FeatureCode] = &[FeatureCode::EPUB_A11Y_10_A];

const WCAG_22: &[FeatureCode] = &[FeatureCode::WCAG_22, FeatureCode::WCAG_21, FeatureCode::WCAG_20];
const WCAG_21: &[FeatureCode] = &[FeatureCode::WCAG_21, FeatureCode::WCAG_20];
const WCAG_20: &[FeatureCode] = &[FeatureCode::WCAG_20];

const LEVEL_AAA: &[FeatureCode] = &[FeatureCode::WCAG_AAA, FeatureCode::WCAG_AA, FeatureCode::WCAG_A];
const LEVEL_AA: &[FeatureCode] = &[FeatureCode::WCAG_AA, FeatureCode::WCAG_A];
const LEVEL_A: &[FeatureCode] = &[FeatureCode::WCAG_A];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum WcagLevel {
    A,
    AA,
    AAA,
}

/// Highest WCAG level named by a standalone token (`level aa`, `wcag-aa`, `...-aaa`).
fn wcag_level(value: &str) -> Option<WcagLevel> {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|token| match token {
            "a" => Some(WcagLevel::A),
            "aa" => Some(WcagLevel::AA),
            "aaa" => Some(WcagLevel::AAA),
            _ => None,
        })
        .max()
}

/// Parse a lower-cased `conformsTo` value into the codes it claims.
pub fn parse_conformance(value: &str, features: &mut FeatureSet) {
    let level = wcag_level(value);

    if value.contains("epub-a11y-11") || value.contains("epub accessibility 1.1") {
        features.extend(EPUB_11.iter().copied());
        info!("EPUB Accessibility 1.1 conformance declared");
    } else if value.contains("epub-a11y-10")
        || value.contains("epub accessibility 1.0")
        || value.contains("idpf.org/epub/a11y/accessibility-20170105")
    {
        if level >= Some(WcagLevel::AA) {
            features.extend(EPUB_10_AA.iter().copied());
            info!("EPUB Accessibility 1.0 AA conformance declared");
        } else {
            features.extend(EPUB_10_A.iter().copied());
            info!("EPUB Accessibility 1.0 A conformance declared");
        }
    }

    if !value.contains("wcag") {
        return;
    }

    // Both "wcag 2.1" and the compact "wcag-21" forms occur
    let version = |dotted: &str, compact: &str| value.contains(dotted) || value.contains(compact);
    if version("2.2", "wcag-22") {
        features.extend(WCAG_22.iter().copied());
        info!("WCAG 2.2 conformance declared");
    } else if version("2.1", "wcag-21") {
        features.extend(WCAG_21.iter().copied());
        info!("WCAG 2.1 conformance declared");
    } else if version("2.0", "wcag-20") {
        features.extend(WCAG_20.iter().copied());
        info!("WCAG 2.0 conformance declared");
    }

    match level {
        Some(WcagLevel::AAA) => features.extend(LEVEL_AAA.iter().copied()),
        Some(WcagLevel::AA) => features.extend(LEVEL_AA.iter().copied()),
        Some(WcagLevel::A) => features.extend(LEVEL_A.iter().copied()),
        None => {}
    }
}

/// Derive compliance codes from certification and feature evidence.
///
/// Monotonic and idempotent: codes are only ever added, and a second pass
/// adds nothing.
pub fn infer_conformance(features: &mut FeatureSet) {
    if features.contains(FeatureCode::CERTIFIED_BY) {
        features.extend(EPUB_11.iter().copied());
        features.extend(WCAG_21.iter().copied());
        features.extend(LEVEL_AA.iter().copied());
        info!("Inferred EPUB Accessibility 1.1 and WCAG 2.1 AA from certification");
    }

    let core_navigation = [
        FeatureCode::TABLE_OF_CONTENTS,
        FeatureCode::READING_ORDER,
        FeatureCode::ARIA,
        FeatureCode::SIGHT_FREE_READING,
    ];
    if core_navigation.iter().all(|&code| features.contains(code))
        && !features.contains(FeatureCode::EPUB_A11Y_11)
    {
        features.extend(EPUB_11.iter().copied());
        info!("Inferred EPUB Accessibility 1.1 from navigation and sight-free reading features");
    }

    if EPUB_11.iter().any(|&code| features.contains(code))
        && features.insert(FeatureCode::HIGH_CONTRAST)
    {
        info!("Inferred high contrast from EPUB Accessibility compliance");
    }
}
