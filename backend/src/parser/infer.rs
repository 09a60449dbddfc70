//! Datatype inference from sample cell values.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::XSD_STRING;

/// Rules tried in order against the first sample; the first match wins.
static DATATYPE_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^\d+$", "xsd:integer"),
        (r"^\d*\.\d+$", "xsd:decimal"),
        (r"^\d{4}$", "xsd:gYear"),
        (r"^\d{4}-\d{2}-\d{2}", "xsd:date"),
        (r"^https?://", "xsd:anyURI"),
        (r"(?i)^(true|false|yes|no|1|0)$", "xsd:boolean"),
    ]
    .into_iter()
    .filter_map(|(pattern, datatype)| Regex::new(pattern).ok().map(|re| (re, datatype)))
    .collect()
});

/// Guess an XSD datatype from the first sample value.
///
/// Only the first sample is inspected. Anything unrecognized, or no sample
/// at all, is `xsd:string`. Four-digit years match `xsd:integer` first.
pub fn infer_datatype(samples: &[&str]) -> &'static str {
    let first = match samples.first().map(|s| s.trim()) {
        Some(value) if !value.is_empty() => value,
        _ => return XSD_STRING,
    };

    DATATYPE_RULES
        .iter()
        .find(|(re, _)| re.is_match(first))
        .map(|(_, datatype)| *datatype)
        .unwrap_or(XSD_STRING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_types() {
        assert_eq!(infer_datatype(&["42"]), "xsd:integer");
        assert_eq!(infer_datatype(&["2024"]), "xsd:integer");
        assert_eq!(infer_datatype(&["3.14"]), "xsd:decimal");
        assert_eq!(infer_datatype(&[".5"]), "xsd:decimal");
    }

    #[test]
    fn test_date_uri_and_boolean() {
        assert_eq!(infer_datatype(&["2024-03-01"]), "xsd:date");
        assert_eq!(infer_datatype(&["2024-03-01T10:00:00"]), "xsd:date");
        assert_eq!(infer_datatype(&["https://example.org/x"]), "xsd:anyURI");
        assert_eq!(infer_datatype(&["Yes"]), "xsd:boolean");
        assert_eq!(infer_datatype(&["FALSE"]), "xsd:boolean");
    }

    #[test]
    fn test_fallback_to_string() {
        assert_eq!(infer_datatype(&[]), XSD_STRING);
        assert_eq!(infer_datatype(&["   "]), XSD_STRING);
        assert_eq!(infer_datatype(&["hello", "42"]), XSD_STRING);
    }
}
