//! Placeholder and contamination signatures.
//!
//! A small instruction-tuned model prompted to return JSON will
//! sometimes echo the template wording back ("string or null",
//! "MM/DD/YYYY") or copy values from few-shot examples instead of
//! reading the document. This module is the single read-only table of
//! those failure signatures, shared by the response validator (which
//! rejects whole candidates) and the field normalizer (which re-rejects
//! individual cleaned values).

use lazy_static::lazy_static;

use crate::record::FieldKind;

lazy_static! {
    /// Template wording that marks a candidate as non-extracted content.
    /// Matched case-insensitively as substrings of scalar values.
    pub static ref TEMPLATE_SIGNATURES: Vec<&'static str> = vec![
        "string or null",
        "or null",
        "mm/dd/yyyy",
        "dd/mm/yyyy",
        "2-letter code",
        "m or f",
        "<extract",
    ];

    /// Example values known to leak from few-shot prompts, keyed by the
    /// canonical field they appear under. A narrow, explicitly
    /// enumerated denylist; there is no general "looks like an example"
    /// heuristic. Compared case-insensitively against the trimmed value.
    pub static ref CONTAMINATION_DENYLIST: Vec<(&'static str, &'static str)> = vec![
        ("first_name", "john"),
        ("last_name", "smith"),
        ("last_name", "doe smith"),
        ("dln", "d123-456-789-000"),
        ("street_address", "123 e main st"),
        ("city", "sacramento"),
        ("city", "lexington"),
    ];

    /// The US state abbreviation table used by state normalization.
    pub static ref STATE_ABBREVIATIONS: Vec<&'static str> = vec![
        "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA",
        "HI", "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD",
        "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
        "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC",
        "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
    ];
}

/// Check if a scalar value carries any template signature.
///
/// This is the candidate-level check: one hit rejects the whole
/// candidate JSON, because a model that echoed the template for one
/// field cannot be trusted for the others.
pub fn contains_template_text(value: &str) -> bool {
    let lower = value.to_lowercase();
    TEMPLATE_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Check if a value under a canonical key matches the contamination
/// denylist.
pub fn is_contaminated(key: &str, value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    CONTAMINATION_DENYLIST
        .iter()
        .any(|(field, example)| *field == key && lower == *example)
}

/// Category-specific placeholder check applied to a trimmed value by the
/// field normalizer. Wider than the candidate-level signatures: each
/// category knows the fragments its own template line could shed.
pub fn is_placeholder(kind: FieldKind, value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    if lower.is_empty() || lower == "null" || lower == "none" {
        return true;
    }

    match kind {
        FieldKind::Name => {
            // Real names survive: the keywords only count when the value
            // has shed extra template words ("First Name string or null").
            let keywords = ["string", "null", "or", "name"];
            lower.split_whitespace().count() > 2
                && keywords.iter().any(|k| lower.contains(k))
        }
        FieldKind::Dln => lower.contains("string") || lower.contains("or"),
        FieldKind::Date => {
            lower.contains("or") || lower == "mm/dd/yyyy" || lower == "dd/mm/yyyy"
        }
        FieldKind::Address | FieldKind::City | FieldKind::Zip => {
            lower.contains("string") || lower.contains("or null")
        }
        // State placeholder wording ("2-LETTER CODE OR NULL") never
        // passes the anchored two-letter shape check, so the shape check
        // is the placeholder check.
        FieldKind::State => false,
        FieldKind::Sex => lower.contains("or") || lower.contains("null"),
    }
}
