//! # dlx-core
//!
//! Deterministic validation and normalization core for driver's-license
//! extraction.
//!
//! A scanned license goes through OCR and then a small instruction-tuned
//! model prompted to return JSON. This crate owns the two stages that
//! make that output trustworthy:
//!
//! - **Response validation**: locate a JSON object in the raw model
//!   text, reject known failure signatures (placeholder echo, few-shot
//!   contamination, invented nesting), and produce a flat field mapping.
//! - **Field normalization**: clean each accepted scalar into canonical
//!   form, degrading to explicit absence whenever a value cannot be
//!   trusted.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same input text always produces the same record
//! 2. **No LLM calls, no I/O**: pure functions over one document's text
//! 3. **Fails closed**: template text is never surfaced as data;
//!    "I don't know this field" is always preferred over a guess
//! 4. **Parallel-safe**: no shared mutable state beyond read-only
//!    signature tables
//!
//! ## Example
//!
//! ```rust
//! use dlx_core::extract;
//!
//! let raw = r#"{"first_name":"HARRISON","last_name":"MONA COOPER",
//!               "dln":"S123-259-256","date_of_birth":"02/23/1953",
//!               "expiration_date":"02/23/2027","street_address":"313 E 3RD ST",
//!               "city":"FRANKFORT","state":"KY","zip_code":"40601","sex":"F"}"#;
//!
//! let record = extract(raw).unwrap();
//! assert_eq!(record.first_name.as_deref(), Some("Harrison"));
//! assert!(record.is_validated());
//! ```

pub mod normalizer;
pub mod record;
pub mod report;
pub mod signatures;
pub mod validator;

pub use normalizer::{normalize_field, normalize_fields};
pub use record::{
    empty_fields, field_kind, FieldKind, FieldRecord, RawFields, EXPECTED_FIELDS, REQUIRED_FIELDS,
};
pub use report::{FieldIssue, FieldWarning, ValidationReport};
pub use validator::{ResponseValidator, ValidateError};

/// Run the full pipeline over raw model output: validate, then
/// normalize.
///
/// The error is recoverable by design; the conventional caller policy
/// is to fall back to [`FieldRecord::all_absent`].
pub fn extract(raw: &str) -> Result<FieldRecord, ValidateError> {
    let fields = ResponseValidator::new().validate(raw)?;
    Ok(normalize_fields(&fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_document_round_trips() {
        let raw = r#"{"first_name":"HARRISON","last_name":"MONA COOPER","dln":"S123-259-256","date_of_birth":"02/23/1953","expiration_date":"02/23/2027","street_address":"313 E 3RD ST","city":"FRANKFORT","state":"KY","zip_code":"40601","sex":"F"}"#;

        let record = extract(raw).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Harrison"));
        assert_eq!(record.last_name.as_deref(), Some("Mona Cooper"));
        assert_eq!(record.dln.as_deref(), Some("S123-259-256"));
        assert_eq!(record.date_of_birth.as_deref(), Some("02/23/1953"));
        assert_eq!(record.expiration_date.as_deref(), Some("02/23/2027"));
        assert_eq!(record.street_address.as_deref(), Some("313 E 3rd St"));
        assert_eq!(record.city.as_deref(), Some("Frankfort"));
        assert_eq!(record.state.as_deref(), Some("KY"));
        assert_eq!(record.zip_code.as_deref(), Some("40601"));
        assert_eq!(record.sex.as_deref(), Some("F"));
        assert!(record.is_validated());
    }

    #[test]
    fn test_full_template_echo_yields_failure() {
        let raw = r#"{"first_name":"string or null","last_name":"string or null","dln":"string or null","date_of_birth":"MM/DD/YYYY or null","expiration_date":"MM/DD/YYYY or null","street_address":"string or null","city":"string or null","state":"2-LETTER CODE OR NULL","zip_code":"string or null","sex":"M or F or null"}"#;

        let result = extract(raw);
        assert!(matches!(
            result,
            Err(ValidateError::ContaminationDetected { .. })
        ));

        // Conventional caller fallback: every field absent.
        let record = result.unwrap_or_else(|_| FieldRecord::all_absent());
        for key in EXPECTED_FIELDS {
            assert_eq!(record.get(key), None, "{key} should be absent");
        }
    }

    #[test]
    fn test_malformed_fields_survive_validator_but_not_normalizer() {
        // Values that are not template echo pass the candidate-level
        // checks, then degrade to absence field by field.
        let raw = r#"{"first_name":"HARRISON","date_of_birth":"2/3/53","state":"Kentucky","sex":"Female"}"#;

        let record = extract(raw).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Harrison"));
        assert_eq!(record.date_of_birth, None);
        assert_eq!(record.state, None);
        assert_eq!(record.sex, None);
    }

    #[test]
    fn test_prose_wrapped_response_normalizes() {
        let raw = "Here is what I found on the license:\n```json\n{\"first_name\": \"harrison\", \"state\": \"ky\", \"sex\": \"f\"}\n```";

        let record = extract(raw).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Harrison"));
        assert_eq!(record.state.as_deref(), Some("KY"));
        assert_eq!(record.sex.as_deref(), Some("F"));
        assert!(!record.is_validated());
    }

    #[test]
    fn test_report_on_extracted_record() {
        let raw = r#"{"first_name":"HARRISON","last_name":"MONA COOPER","dln":"S123-259-256","date_of_birth":"02/23/1953","expiration_date":"02/23/2027"}"#;

        let record = extract(raw).unwrap();
        let report = ValidationReport::for_record_at(
            &record,
            chrono::NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        );
        assert!(report.missing_fields.is_empty());
        assert!(report.is_clean());
    }
}
