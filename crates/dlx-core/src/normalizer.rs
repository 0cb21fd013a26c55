//! Per-field cleanup of accepted scalar values.
//!
//! Every rule here degrades to absence instead of raising: a malformed
//! date, an unknown state code, or a value that still smells like
//! template text becomes `None` for that field only, never a
//! document-level failure. Normalization is idempotent; canonical
//! values are fixed points.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::record::{field_kind, FieldKind, FieldRecord, RawFields, EXPECTED_FIELDS};
use crate::signatures::{is_placeholder, STATE_ABBREVIATIONS};

lazy_static! {
    static ref DATE_SHAPE: Regex = Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").unwrap();
    static ref STATE_SHAPE: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
    static ref ZIP_SHAPE: Regex = Regex::new(r"^(\d{5})(?:-?(\d{4}))?$").unwrap();
}

/// Normalize a full raw-field mapping into a [`FieldRecord`].
pub fn normalize_fields(fields: &RawFields) -> FieldRecord {
    let mut record = FieldRecord::all_absent();
    for key in EXPECTED_FIELDS {
        let kind = field_kind(key).expect("expected fields all have a kind");
        let raw = fields.get(key).and_then(|slot| slot.as_deref());
        let cleaned = normalize_field(kind, raw);
        if raw.is_some() && cleaned.is_none() {
            debug!(field = key, "field rejected during normalization");
        }
        record.set(key, cleaned);
    }
    record
}

/// Normalize one raw scalar for a field of the given category.
///
/// Shared first step for every category: absence stays absence, and a
/// trimmed value matching the category's placeholder signatures becomes
/// absence before any canonicalization runs.
pub fn normalize_field(kind: FieldKind, value: Option<&str>) -> Option<String> {
    let raw = value?.trim();
    if is_placeholder(kind, raw) {
        return None;
    }

    match kind {
        FieldKind::Name | FieldKind::Address | FieldKind::City => Some(title_case(raw)),
        FieldKind::Dln => Some(canonical_dln(raw)),
        FieldKind::Date => canonical_date(raw),
        FieldKind::State => canonical_state(raw),
        FieldKind::Zip => canonical_zip(raw),
        FieldKind::Sex => canonical_sex(raw),
    }
}

/// Collapse internal whitespace and title-case each word.
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase with all internal whitespace stripped.
fn canonical_dln(value: &str) -> String {
    value
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .concat()
}

/// Accept only the fixed `MM/DD/YYYY` shape: two-digit month 01-12,
/// two-digit day 01-31, four-digit year. Anything else is absence.
fn canonical_date(value: &str) -> Option<String> {
    let caps = DATE_SHAPE.captures(value)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(value.to_string())
}

/// Accept only a two-letter token present in the state table.
fn canonical_state(value: &str) -> Option<String> {
    let upper = value.to_uppercase();
    if !STATE_SHAPE.is_match(&upper) {
        return None;
    }
    STATE_ABBREVIATIONS
        .contains(&upper.as_str())
        .then_some(upper)
}

/// Accept a 5-digit or 5+4 token, canonicalized with a hyphen.
fn canonical_zip(value: &str) -> Option<String> {
    let caps = ZIP_SHAPE.captures(value)?;
    match caps.get(2) {
        Some(plus4) => Some(format!("{}-{}", &caps[1], plus4.as_str())),
        None => Some(caps[1].to_string()),
    }
}

/// Accept a single character M or F, case-insensitive.
fn canonical_sex(value: &str) -> Option<String> {
    match value {
        "M" | "m" => Some("M".to_string()),
        "F" | "f" => Some("F".to_string()),
        _ => None,
    }
}
