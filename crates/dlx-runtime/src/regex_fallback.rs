//! Regex fallback extraction straight from OCR text.
//!
//! Last line of defense when the model call fails or its output is
//! rejected. Tuned for the line-numbered layout US licenses OCR into;
//! recall is partial by design — whatever it finds still goes through
//! the same normalization as model output, and the rest stays absent.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use dlx_core::{empty_fields, RawFields};

lazy_static! {
    // DLN near a license label: optional letter prefix, 3-4 dashed
    // groups of digits.
    static ref DLN_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:DLN|LIC|Driver'?s?\s+License|License)\b[^A-Za-z0-9]*([A-Z]?[0-9]{3}(?:-[0-9]{3}){2,3})"
    ).unwrap();

    static ref DOB_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:Date of Birth|DOB|3008)\b[:\s]*([0-9]{1,4}[-/][0-9]{1,2}[-/][0-9]{2,4})"
    ).unwrap();

    static ref EXPIRATION_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:Expiration Date|Expiry|EXP)\b[:\s]*([0-9]{1,4}[-/][0-9]{1,2}[-/][0-9]{2,4})"
    ).unwrap();

    static ref SEX_PATTERN: Regex = Regex::new(
        r"(?i)\bSex\b[:\s]*(Male|Female|M|F)\b"
    ).unwrap();

    // Street, city, state, and zip in one span. The street must open
    // with house number then a letter, so OCR line-number prefixes
    // ("8 313 E 3RD ST") do not get absorbed; the suffix is bounded so
    // the RD inside "3RD" cannot end the street early.
    static ref ADDRESS_PATTERN: Regex = Regex::new(
        r"(?i)([0-9]{1,6}\s+[A-Z][A-Z0-9\s]*?\b(?:ST|STREET|RD|ROAD|AVE|AVENUE|BLVD|BOULEVARD|DR|DRIVE|LN|LANE|CT|COURT|HWY|PKWY|PL|TER|WAY|CIR)\b\.?)\s*,?\s*([A-Z][A-Za-z\s]+?)\s*,?\s*([A-Z]{2})\s+([0-9]{5}(?:-[0-9]{4})?)\b"
    ).unwrap();

    // Line-numbered name fields as US licenses OCR them:
    // "1 JOHN" / "2 DOE SMITH".
    static ref FIRST_NAME_LINE: Regex = Regex::new(
        r"(?m)^[^A-Za-z\r\n]*1\s+([A-Z]+)\s*$"
    ).unwrap();
    static ref LAST_NAME_LINE: Regex = Regex::new(
        r"(?m)^[^A-Za-z\r\n]*2\s+([A-Z]+(?: [A-Z]+)*)\s*$"
    ).unwrap();
}

/// Deterministic extractor over raw OCR text.
#[derive(Debug, Default)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scan OCR text for whatever fields the patterns can find.
    ///
    /// Keys the patterns miss stay absent; the output feeds the same
    /// normalizer as validated model output.
    pub fn extract(&self, ocr_text: &str) -> RawFields {
        let mut fields = empty_fields();

        if let Some(caps) = FIRST_NAME_LINE.captures(ocr_text) {
            fields.insert("first_name", Some(caps[1].to_string()));
        }
        if let Some(caps) = LAST_NAME_LINE.captures(ocr_text) {
            fields.insert("last_name", Some(caps[1].to_string()));
        }
        if let Some(caps) = DLN_PATTERN.captures(ocr_text) {
            fields.insert("dln", Some(caps[1].to_string()));
        }
        if let Some(caps) = DOB_PATTERN.captures(ocr_text) {
            fields.insert("date_of_birth", Some(caps[1].to_string()));
        }
        if let Some(caps) = EXPIRATION_PATTERN.captures(ocr_text) {
            fields.insert("expiration_date", Some(caps[1].to_string()));
        }
        if let Some(caps) = SEX_PATTERN.captures(ocr_text) {
            // "Male"/"Female" collapse to the single character the
            // normalizer accepts.
            let initial = caps[1][..1].to_uppercase();
            fields.insert("sex", Some(initial));
        }
        if let Some(caps) = ADDRESS_PATTERN.captures(ocr_text) {
            fields.insert("street_address", Some(caps[1].trim().to_string()));
            fields.insert("city", Some(caps[2].trim().to_string()));
            fields.insert("state", Some(caps[3].to_uppercase()));
            fields.insert("zip_code", Some(caps[4].to_string()));
        }

        let found = fields.values().filter(|slot| slot.is_some()).count();
        debug!(found, "regex fallback extraction finished");
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OCR: &str = "\
1 HARRISON
2 MONA COOPER
3 DOB 02/23/1953
4d DLN S123-259-256
4b EXP 02/23/2027
8 313 E 3RD ST
FRANKFORT KY 40601
15 SEX F
";

    #[test]
    fn test_extracts_names_from_numbered_lines() {
        let fields = RegexExtractor::new().extract(SAMPLE_OCR);
        assert_eq!(fields["first_name"].as_deref(), Some("HARRISON"));
        assert_eq!(fields["last_name"].as_deref(), Some("MONA COOPER"));
    }

    #[test]
    fn test_extracts_dln_and_dates() {
        let fields = RegexExtractor::new().extract(SAMPLE_OCR);
        assert_eq!(fields["dln"].as_deref(), Some("S123-259-256"));
        assert_eq!(fields["date_of_birth"].as_deref(), Some("02/23/1953"));
        assert_eq!(fields["expiration_date"].as_deref(), Some("02/23/2027"));
    }

    #[test]
    fn test_extracts_combined_address_span() {
        let fields = RegexExtractor::new().extract(SAMPLE_OCR);
        assert_eq!(fields["street_address"].as_deref(), Some("313 E 3RD ST"));
        assert_eq!(fields["city"].as_deref(), Some("FRANKFORT"));
        assert_eq!(fields["state"].as_deref(), Some("KY"));
        assert_eq!(fields["zip_code"].as_deref(), Some("40601"));
    }

    #[test]
    fn test_sex_words_collapse_to_initial() {
        let fields = RegexExtractor::new().extract("Sex: Female");
        assert_eq!(fields["sex"].as_deref(), Some("F"));

        let fields = RegexExtractor::new().extract("15 SEX M");
        assert_eq!(fields["sex"].as_deref(), Some("M"));
    }

    #[test]
    fn test_four_group_dln() {
        let fields = RegexExtractor::new().extract("4d DLN D123-456-789-000");
        assert_eq!(fields["dln"].as_deref(), Some("D123-456-789-000"));
    }

    #[test]
    fn test_unreadable_text_yields_all_absent() {
        let fields = RegexExtractor::new().extract("no structure here at all");
        assert!(fields.values().all(|slot| slot.is_none()));
    }
}
