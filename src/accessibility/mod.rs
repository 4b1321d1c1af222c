//! EPUB accessibility detection.
//!
//! [`detect`] opens an EPUB package and produces a [`FeatureSet`] of
//! Codelist 196 codes. The set is then enriched by [`infer_conformance`]
//! before it is handed to the ONIX builders.

mod conformance;
mod detector;
mod metadata;
mod package;
mod stylesheet;

use std::collections::{BTreeMap, BTreeSet};

pub use conformance::{infer_conformance, parse_conformance};
pub use detector::detect;
pub use metadata::{MetaEntry, OpfMetadata, apply_entry, parse_opf_metadata};
pub use package::Package;
pub use stylesheet::declares_readability_properties;

use crate::codelist::FeatureCode;
use crate::error::Result;

/// The accessibility features detected for one publication.
///
/// Only codes from Codelist 196 can be stored. An optional free-text summary
/// (the package's `accessibilitySummary`) travels with the codes so that the
/// summary feature can carry it as its description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    codes: BTreeSet<FeatureCode>,
    summary: Option<String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from textual codes such as `["11", "13", "36"]`.
    pub fn from_codes<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = FeatureSet::new();
        for code in codes {
            set.insert(code.as_ref().parse()?);
        }
        Ok(set)
    }

    /// Add a code. Returns `true` if it was not already present.
    pub fn insert(&mut self, code: FeatureCode) -> bool {
        self.codes.insert(code)
    }

    pub fn extend<I: IntoIterator<Item = FeatureCode>>(&mut self, codes: I) {
        self.codes.extend(codes);
    }

    pub fn contains(&self, code: FeatureCode) -> bool {
        self.codes.contains(&code)
    }

    /// Codes in ascending numeric order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        let summary = summary.into();
        if !summary.trim().is_empty() {
            self.summary = Some(summary.trim().to_string());
        }
    }

    /// Text used as the description of the summary feature (code 00).
    ///
    /// Uses the package's own summary when one was declared, otherwise lists
    /// the other detected features.
    pub fn summary_text(&self) -> String {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }

        let listed: Vec<&str> = self
            .iter()
            .filter(|&code| code != FeatureCode::SUMMARY)
            .map(FeatureCode::description)
            .collect();

        if listed.is_empty() {
            "No accessibility features were declared for this publication.".to_string()
        } else {
            format!(
                "This publication provides the following accessibility features: {}.",
                listed.join("; ")
            )
        }
    }

    /// Presence map keyed by two-digit code, e.g. `{"11": true}`.
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.iter().map(|code| (code.to_string(), true)).collect()
    }
}

impl FromIterator<FeatureCode> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = FeatureCode>>(iter: I) -> Self {
        FeatureSet {
            codes: iter.into_iter().collect(),
            summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_codes() {
        let set = FeatureSet::from_codes(["11", "13", "36"]).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(FeatureCode::TABLE_OF_CONTENTS));
        assert!(set.contains(FeatureCode::READING_ORDER));
        assert!(set.contains(FeatureCode::MODIFIABLE_TEXT));

        assert!(FeatureSet::from_codes(["11", "23"]).is_err());
    }

    #[test]
    fn test_iter_is_ordered() {
        let set: FeatureSet = [
            FeatureCode::WCAG_AA,
            FeatureCode::EPUB_A11Y_10_A,
            FeatureCode::LANGUAGE_TAGGING,
        ]
        .into_iter()
        .collect();
        let values: Vec<u8> = set.iter().map(FeatureCode::value).collect();
        assert_eq!(values, vec![2, 22, 85]);
    }

    #[test]
    fn test_to_map() {
        let set = FeatureSet::from_codes(["2", "11"]).unwrap();
        let map = set.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("02"), Some(&true));
        assert_eq!(map.get("11"), Some(&true));
    }

    #[test]
    fn test_summary_text() {
        let mut set = FeatureSet::from_codes(["0", "11", "13"]).unwrap();
        let generated = set.summary_text();
        assert!(generated.contains("Table of contents navigation"));
        assert!(generated.contains("Single logical reading order"));
        assert!(!generated.contains("Accessibility summary"));

        set.set_summary("  Fully navigable, no hazards.  ");
        assert_eq!(set.summary_text(), "Fully navigable, no hazards.");

        set.set_summary("   ");
        assert_eq!(set.summary(), Some("Fully navigable, no hazards."));
    }

    #[test]
    fn test_empty_summary_text() {
        assert!(FeatureSet::new().summary_text().starts_with("No accessibility"));
    }
}
