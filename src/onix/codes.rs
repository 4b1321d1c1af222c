//! Legacy (2.1) names and code values mapped to their 3.0 equivalents.

use chrono::NaiveDate;

/// Data elements renamed between 2.1 and 3.0 with unchanged content.
static RENAMES: &[(&str, &str)] = &[
    ("PersonNameIdentifier", "NameIdentifier"),
    ("PersonNameIDType", "NameIDType"),
    ("MeasureTypeCode", "MeasureType"),
    ("EditionTypeCode", "EditionType"),
    ("RelationCode", "ProductRelationCode"),
    ("PriceTypeCode", "PriceType"),
    ("TaxRateCode1", "TaxType"),
    ("TaxRatePercent1", "TaxRatePercent"),
    ("TaxableAmount1", "TaxableAmount"),
    ("TaxAmount1", "TaxAmount"),
    ("SalesRestrictionDetail", "SalesRestrictionNote"),
    ("TextTypeCode", "TextType"),
    ("MediaFileLink", "ResourceLink"),
];

/// 3.0 name for a legacy data element.
pub fn rename(name: &str) -> &str {
    RENAMES
        .iter()
        .find(|(old, _)| *old == name)
        .map_or(name, |(_, new)| *new)
}

/// Product form: the retired `DG` (electronic book text) becomes `EA`.
pub fn product_form(code: &str) -> String {
    match code {
        "DG" => "EA".to_string(),
        other => other.to_string(),
    }
}

/// 2.1 `EpubType` to a 3.0 `ProductFormDetail`.
pub fn epub_type_form_detail(epub_type: &str) -> &'static str {
    match epub_type {
        "029" => "E101", // EPUB
        "002" => "E107", // PDF
        "001" => "E105", // HTML
        _ => "E200",     // reflowable
    }
}

/// 2.1 `TextTypeCode` (List 33) to 3.0 `TextType` (List 153).
pub fn text_type(code: &str) -> Option<&'static str> {
    Some(match code {
        "01" | "03" | "99" => "03",
        "02" => "02",
        "04" => "04",
        "08" => "06",
        "13" => "12",
        "23" => "14",
        _ => return None,
    })
}

/// 2.1 `MediaFileTypeCode` (List 38) to 3.0 `ResourceContentType` (List 158).
pub fn resource_content_type(code: &str) -> Option<&'static str> {
    Some(match code {
        "04" | "06" | "07" => "01", // front cover
        "08" => "04",               // contributor picture
        "10" => "05",               // series image
        "11" => "06",               // series logo
        "12" => "08",               // product logo
        "16" => "09",               // publisher logo
        "17" => "10",               // imprint logo
        "23" => "15",               // sample content
        "24" => "02",               // back cover
        _ => return None,
    })
}

/// Resource mode (List 159) for a legacy media file type: links are
/// interactive, everything else is an image.
pub fn resource_mode(media_file_type: &str) -> &'static str {
    match media_file_type {
        "01" => "04",
        _ => "03",
    }
}

/// 2.1 `AvailabilityCode` (List 54) to a 3.0 `ProductAvailability` (List 65).
pub fn availability(code: &str) -> &'static str {
    match code {
        "IP" => "21",
        "NP" => "10",
        "TU" => "30",
        "OP" => "51",
        "OR" => "41",
        _ => "20",
    }
}

/// Dates to the `YYYYMMDD` form 3.0 expects by default.
///
/// Year-only and year-month values, and anything unrecognised, pass
/// through unchanged.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    for format in ["%Y%m%d", "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.format("%Y%m%d").to_string();
        }
    }
    raw.to_string()
}
