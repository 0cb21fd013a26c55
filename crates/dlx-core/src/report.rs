//! Post-normalization validation report.
//!
//! The report never blocks anything; it tells the downstream consumer
//! what is missing, malformed, or suspicious about a record so a human
//! can decide whether to trust it.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{FieldRecord, REQUIRED_FIELDS};
use crate::signatures::STATE_ABBREVIATIONS;

const CANONICAL_DATE_FORMAT: &str = "%m/%d/%Y";

/// A field whose value failed a format or range check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub value: String,
    pub error: String,
}

/// A non-fatal observation about a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: String,
    pub warning: String,
}

/// Validation findings for one normalized record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Required fields that are absent.
    pub missing_fields: Vec<String>,
    /// Dates that are not real MM/DD/YYYY calendar dates.
    pub format_errors: Vec<FieldIssue>,
    /// Values outside their allowed set.
    pub invalid_values: Vec<FieldIssue>,
    /// Unusual but not disqualifying observations.
    pub warnings: Vec<FieldWarning>,
}

impl ValidationReport {
    /// Build a report against today's date.
    pub fn for_record(record: &FieldRecord) -> Self {
        Self::for_record_at(record, Utc::now().date_naive())
    }

    /// Build a report against a fixed reference date. Age and expiry
    /// warnings are relative to `today`.
    pub fn for_record_at(record: &FieldRecord, today: NaiveDate) -> Self {
        let mut report = Self::default();

        for field in REQUIRED_FIELDS {
            if record.get(field).is_none() {
                report.missing_fields.push(field.to_string());
            }
        }

        if let Some(dob) = record.date_of_birth.as_deref() {
            match NaiveDate::parse_from_str(dob, CANONICAL_DATE_FORMAT) {
                Ok(date) => {
                    let age = years_between(date, today);
                    if !(16..=120).contains(&age) {
                        report.warnings.push(FieldWarning {
                            field: "date_of_birth".to_string(),
                            warning: format!("unusual age: {age} years"),
                        });
                    }
                }
                Err(_) => report.format_errors.push(FieldIssue {
                    field: "date_of_birth".to_string(),
                    value: dob.to_string(),
                    error: "not a real MM/DD/YYYY calendar date".to_string(),
                }),
            }
        }

        if let Some(expiration) = record.expiration_date.as_deref() {
            match NaiveDate::parse_from_str(expiration, CANONICAL_DATE_FORMAT) {
                Ok(date) => {
                    if date < today {
                        report.warnings.push(FieldWarning {
                            field: "expiration_date".to_string(),
                            warning: "license is expired".to_string(),
                        });
                    }
                }
                Err(_) => report.format_errors.push(FieldIssue {
                    field: "expiration_date".to_string(),
                    value: expiration.to_string(),
                    error: "not a real MM/DD/YYYY calendar date".to_string(),
                }),
            }
        }

        if let Some(state) = record.state.as_deref() {
            if !STATE_ABBREVIATIONS.contains(&state) {
                report.invalid_values.push(FieldIssue {
                    field: "state".to_string(),
                    value: state.to_string(),
                    error: "not a US state abbreviation".to_string(),
                });
            }
        }

        if let Some(sex) = record.sex.as_deref() {
            if sex != "M" && sex != "F" {
                report.invalid_values.push(FieldIssue {
                    field: "sex".to_string(),
                    value: sex.to_string(),
                    error: "sex must be M or F".to_string(),
                });
            }
        }

        report
    }

    /// True when nothing at all was flagged.
    pub fn is_clean(&self) -> bool {
        self.missing_fields.is_empty()
            && self.format_errors.is_empty()
            && self.invalid_values.is_empty()
            && self.warnings.is_empty()
    }
}

fn years_between(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldRecord;

    fn reference_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
    }

    fn complete_record() -> FieldRecord {
        FieldRecord {
            first_name: Some("Harrison".to_string()),
            last_name: Some("Mona Cooper".to_string()),
            dln: Some("S123-259-256".to_string()),
            date_of_birth: Some("02/23/1953".to_string()),
            expiration_date: Some("02/23/2027".to_string()),
            street_address: Some("313 E 3rd St".to_string()),
            city: Some("Frankfort".to_string()),
            state: Some("KY".to_string()),
            zip_code: Some("40601".to_string()),
            sex: Some("F".to_string()),
        }
    }

    #[test]
    fn test_complete_record_is_clean() {
        let report = ValidationReport::for_record_at(&complete_record(), reference_day());
        assert!(report.is_clean(), "unexpected findings: {report:?}");
    }

    #[test]
    fn test_missing_required_fields_listed() {
        let report =
            ValidationReport::for_record_at(&FieldRecord::all_absent(), reference_day());
        assert_eq!(report.missing_fields.len(), REQUIRED_FIELDS.len());
        assert!(report.format_errors.is_empty());
    }

    #[test]
    fn test_expired_license_warns() {
        let mut record = complete_record();
        record.expiration_date = Some("02/23/2020".to_string());
        let report = ValidationReport::for_record_at(&record, reference_day());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.field == "expiration_date" && w.warning.contains("expired")));
    }

    #[test]
    fn test_unusual_age_warns() {
        let mut record = complete_record();
        record.date_of_birth = Some("02/23/2015".to_string());
        let report = ValidationReport::for_record_at(&record, reference_day());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.field == "date_of_birth" && w.warning.contains("unusual age")));
    }

    #[test]
    fn test_impossible_calendar_date_is_format_error() {
        // 02/31 passes the shape check but is not a real date.
        let mut record = complete_record();
        record.date_of_birth = Some("02/31/1953".to_string());
        let report = ValidationReport::for_record_at(&record, reference_day());
        assert_eq!(report.format_errors.len(), 1);
        assert_eq!(report.format_errors[0].field, "date_of_birth");
    }

    #[test]
    fn test_hand_built_record_with_bad_state_flagged() {
        let mut record = complete_record();
        record.state = Some("ZZ".to_string());
        let report = ValidationReport::for_record_at(&record, reference_day());
        assert_eq!(report.invalid_values.len(), 1);
        assert_eq!(report.invalid_values[0].field, "state");
    }
}
