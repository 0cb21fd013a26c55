//! The stable output entity of the extraction pipeline.
//!
//! A [`FieldRecord`] holds the fixed key set of a driver's license with
//! `None` as the explicit absence marker. Absence is a first-class
//! outcome: a field the model could not read is `None`, never a
//! sentinel string, so a canonicalized placeholder can never be
//! confused with real absence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every field the pipeline knows about, in canonical order.
pub const EXPECTED_FIELDS: [&str; 10] = [
    "first_name",
    "last_name",
    "dln",
    "date_of_birth",
    "expiration_date",
    "street_address",
    "city",
    "state",
    "zip_code",
    "sex",
];

/// Fields that must be present for a document to count as validated.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "first_name",
    "last_name",
    "dln",
    "date_of_birth",
    "expiration_date",
];

/// Per-field category driving placeholder signatures and
/// canonicalization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Dln,
    Date,
    Address,
    City,
    State,
    Zip,
    Sex,
}

/// Map a canonical field key to its category.
pub fn field_kind(key: &str) -> Option<FieldKind> {
    match key {
        "first_name" | "last_name" => Some(FieldKind::Name),
        "dln" => Some(FieldKind::Dln),
        "date_of_birth" | "expiration_date" => Some(FieldKind::Date),
        "street_address" => Some(FieldKind::Address),
        "city" => Some(FieldKind::City),
        "state" => Some(FieldKind::State),
        "zip_code" => Some(FieldKind::Zip),
        "sex" => Some(FieldKind::Sex),
        _ => None,
    }
}

/// Flat mapping of canonical key to raw scalar value, as produced by the
/// response validator. Every key in [`EXPECTED_FIELDS`] is present;
/// `None` marks absence.
pub type RawFields = BTreeMap<&'static str, Option<String>>;

/// Create a [`RawFields`] map with every expected key absent.
pub fn empty_fields() -> RawFields {
    EXPECTED_FIELDS.iter().map(|k| (*k, None)).collect()
}

/// A validated and normalized license record.
///
/// Immutable after normalization by convention; downstream consumers
/// read it, they do not patch individual fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dln: Option<String>,
    pub date_of_birth: Option<String>,
    pub expiration_date: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub sex: Option<String>,
}

impl FieldRecord {
    /// The record every failure path degrades to.
    pub fn all_absent() -> Self {
        Self::default()
    }

    /// Look up a field by canonical key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let slot = match key {
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "dln" => &self.dln,
            "date_of_birth" => &self.date_of_birth,
            "expiration_date" => &self.expiration_date,
            "street_address" => &self.street_address,
            "city" => &self.city,
            "state" => &self.state,
            "zip_code" => &self.zip_code,
            "sex" => &self.sex,
            _ => return None,
        };
        slot.as_deref()
    }

    /// Set a field by canonical key. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        let slot = match key {
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "dln" => &mut self.dln,
            "date_of_birth" => &mut self.date_of_birth,
            "expiration_date" => &mut self.expiration_date,
            "street_address" => &mut self.street_address,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "zip_code" => &mut self.zip_code,
            "sex" => &mut self.sex,
            _ => return,
        };
        *slot = value;
    }

    /// Required fields that are absent.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none())
            .collect()
    }

    /// A document validates when no required field is absent.
    pub fn is_validated(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Number of fields carrying a value.
    pub fn present_count(&self) -> usize {
        EXPECTED_FIELDS
            .iter()
            .filter(|key| self.get(key).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_absent_is_not_validated() {
        let record = FieldRecord::all_absent();
        assert!(!record.is_validated());
        assert_eq!(record.missing_required().len(), REQUIRED_FIELDS.len());
        assert_eq!(record.present_count(), 0);
    }

    #[test]
    fn test_required_fields_gate_validation() {
        let mut record = FieldRecord::all_absent();
        record.set("first_name", Some("Harrison".to_string()));
        record.set("last_name", Some("Mona Cooper".to_string()));
        record.set("dln", Some("S123-259-256".to_string()));
        record.set("date_of_birth", Some("02/23/1953".to_string()));
        assert!(!record.is_validated());
        assert_eq!(record.missing_required(), vec!["expiration_date"]);

        record.set("expiration_date", Some("02/23/2027".to_string()));
        assert!(record.is_validated());
    }

    #[test]
    fn test_optional_fields_do_not_gate_validation() {
        let mut record = FieldRecord::all_absent();
        for key in REQUIRED_FIELDS {
            record.set(key, Some("x".to_string()));
        }
        assert!(record.is_validated());
        assert_eq!(record.get("city"), None);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut record = FieldRecord::all_absent();
        record.set("confidence", Some("0.9".to_string()));
        assert_eq!(record, FieldRecord::all_absent());
        assert_eq!(record.get("confidence"), None);
    }

    #[test]
    fn test_absence_serializes_as_null() {
        let record = FieldRecord::all_absent();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["first_name"], serde_json::Value::Null);

        let back: FieldRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_every_expected_field_has_a_kind() {
        for key in EXPECTED_FIELDS {
            assert!(field_kind(key).is_some(), "no kind for {key}");
        }
        assert!(field_kind("confidence").is_none());
    }
}
