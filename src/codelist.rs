//! EDItEUR Codelist 196: accessibility feature and compliance codes.
//!
//! Codes are carried as [`FeatureCode`], which can only hold a value present
//! in [`CODELIST_196`]. On the wire (ONIX `ProductFormFeatureValue`, JSON keys)
//! a code is always written with two digits, e.g. `"02"` or `"36"`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Codelist 196 entries, sorted by code.
pub static CODELIST_196: &[(u8, &str)] = &[
    (0, "Accessibility summary"),
    (1, "LIA Compliance Scheme"),
    (2, "EPUB Accessibility Specification 1.0 A"),
    (3, "EPUB Accessibility Specification 1.0 AA"),
    (4, "EPUB Accessibility Specification 1.1"),
    (5, "PDF/UA"),
    (8, "Unknown accessibility"),
    (9, "Inaccessible, or known limited accessibility"),
    (10, "No reading system accessibility options actively disabled (except)"),
    (11, "Table of contents navigation"),
    (12, "Index navigation"),
    (13, "Single logical reading order"),
    (14, "Short alternative textual descriptions"),
    (15, "Full alternative textual descriptions"),
    (16, "Visualized data also available as non-graphical data"),
    (17, "Accessible math content as MathML"),
    (18, "Accessible chemistry content as ChemML"),
    (19, "Print-equivalent page numbering"),
    (20, "Synchronized pre-recorded audio"),
    (21, "Text-to-speech hinting provided"),
    (22, "Language tagging provided"),
    (24, "Dyslexia readability"),
    (25, "Use of color is not the sole means of conveying information"),
    (26, "Use of high contrast between text and background color"),
    (27, "Use of high contrast between foreground and background audio"),
    (28, "Full alternative audio descriptions"),
    (29, "Next/Previous structural navigation"),
    (30, "ARIA roles provided"),
    (31, "Accessible controls provided"),
    (32, "Landmark navigation"),
    (34, "Accessible chemistry content (as MathML)"),
    (35, "Accessible math content (as LaTeX)"),
    (36, "All textual content can be modified"),
    (37, "Use of ultra-high contrast between text foreground and background"),
    (38, "Unusual words or abbreviations explained"),
    (39, "Supplementary material to an audiobook is accessible"),
    (40, "Link purposes clear"),
    (51, "All non-decorative content supports reading via pre-recorded audio"),
    (52, "All non-decorative content supports reading without sight"),
    (75, "EAA exception 1 - Micro-enterprises"),
    (76, "EAA exception 2 - Disproportionate burden"),
    (77, "EAA exception 3 - Fundamental modification"),
    (80, "WCAG v2.0"),
    (81, "WCAG v2.1"),
    (82, "WCAG v2.2"),
    (84, "WCAG level A"),
    (85, "WCAG level AA"),
    (86, "WCAG level AAA"),
    (91, "Latest accessibility assessment date"),
    (92, "Accessibility addendum"),
    (93, "Compliance certification by"),
    (94, "Compliance web page for detailed accessibility information"),
    (95, "Trusted intermediary's web page for detailed accessibility information"),
    (96, "Publisher's web page for detailed accessibility information"),
    (97, "Compatibility tested"),
    (98, "Trusted intermediary contact"),
    (99, "Publisher contact for further accessibility information"),
];

/// A code from Codelist 196.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureCode(u8);

impl FeatureCode {
    pub const SUMMARY: FeatureCode = FeatureCode(0);
    pub const EPUB_A11Y_10_A: FeatureCode = FeatureCode(2);
    pub const EPUB_A11Y_10_AA: FeatureCode = FeatureCode(3);
    pub const EPUB_A11Y_11: FeatureCode = FeatureCode(4);
    pub const PDF_UA: FeatureCode = FeatureCode(5);
    pub const NO_OPTIONS_DISABLED: FeatureCode = FeatureCode(10);
    pub const TABLE_OF_CONTENTS: FeatureCode = FeatureCode(11);
    pub const INDEX: FeatureCode = FeatureCode(12);
    pub const READING_ORDER: FeatureCode = FeatureCode(13);
    pub const SHORT_ALT_TEXT: FeatureCode = FeatureCode(14);
    pub const FULL_ALT_TEXT: FeatureCode = FeatureCode(15);
    pub const NON_GRAPHICAL_DATA: FeatureCode = FeatureCode(16);
    pub const MATHML: FeatureCode = FeatureCode(17);
    pub const CHEMML: FeatureCode = FeatureCode(18);
    pub const PAGE_NUMBERING: FeatureCode = FeatureCode(19);
    pub const SYNCHRONIZED_AUDIO: FeatureCode = FeatureCode(20);
    pub const TTS_HINTING: FeatureCode = FeatureCode(21);
    pub const LANGUAGE_TAGGING: FeatureCode = FeatureCode(22);
    pub const DYSLEXIA_READABILITY: FeatureCode = FeatureCode(24);
    pub const HIGH_CONTRAST: FeatureCode = FeatureCode(26);
    pub const AUDIO_CONTRAST: FeatureCode = FeatureCode(27);
    pub const FULL_AUDIO_DESCRIPTION: FeatureCode = FeatureCode(28);
    pub const STRUCTURAL_NAVIGATION: FeatureCode = FeatureCode(29);
    pub const ARIA: FeatureCode = FeatureCode(30);
    pub const ACCESSIBLE_CONTROLS: FeatureCode = FeatureCode(31);
    pub const LANDMARKS: FeatureCode = FeatureCode(32);
    pub const CHEMISTRY_MATHML: FeatureCode = FeatureCode(34);
    pub const LATEX: FeatureCode = FeatureCode(35);
    pub const MODIFIABLE_TEXT: FeatureCode = FeatureCode(36);
    pub const ULTRA_HIGH_CONTRAST: FeatureCode = FeatureCode(37);
    pub const GLOSSARY: FeatureCode = FeatureCode(38);
    pub const ACCESSIBLE_SUPPLEMENT: FeatureCode = FeatureCode(39);
    pub const LINK_PURPOSE: FeatureCode = FeatureCode(40);
    pub const AUDIO_READING: FeatureCode = FeatureCode(51);
    pub const SIGHT_FREE_READING: FeatureCode = FeatureCode(52);
    pub const WCAG_20: FeatureCode = FeatureCode(80);
    pub const WCAG_21: FeatureCode = FeatureCode(81);
    pub const WCAG_22: FeatureCode = FeatureCode(82);
    pub const WCAG_A: FeatureCode = FeatureCode(84);
    pub const WCAG_AA: FeatureCode = FeatureCode(85);
    pub const WCAG_AAA: FeatureCode = FeatureCode(86);
    pub const ASSESSMENT_DATE: FeatureCode = FeatureCode(91);
    pub const CERTIFIED_BY: FeatureCode = FeatureCode(93);
    pub const COMPLIANCE_WEB_PAGE: FeatureCode = FeatureCode(94);

    /// Look up a numeric code. Returns `None` for values outside Codelist 196.
    pub fn new(code: u8) -> Option<FeatureCode> {
        CODELIST_196
            .binary_search_by_key(&code, |&(c, _)| c)
            .ok()
            .map(|_| FeatureCode(code))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn description(self) -> &'static str {
        CODELIST_196
            .binary_search_by_key(&self.0, |&(c, _)| c)
            .map(|i| CODELIST_196[i].1)
            .unwrap_or("")
    }

    /// Every code in the list, in ascending order.
    pub fn all() -> impl Iterator<Item = FeatureCode> {
        CODELIST_196.iter().map(|&(c, _)| FeatureCode(c))
    }
}

impl fmt::Display for FeatureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for FeatureCode {
    type Err = Error;

    /// Accepts both `"2"` and `"02"`.
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(FeatureCode::new)
            .ok_or_else(|| Error::InvalidInput(format!("not a Codelist 196 code: {s:?}")))
    }
}
