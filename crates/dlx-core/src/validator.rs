//! Response validation for raw model output.
//!
//! The producing model is small and unreliable: the JSON we asked for
//! may arrive bare, wrapped in prose, inside a fenced code block, or
//! not at all. The validator tries an ordered sequence of extraction
//! strategies, each a pure function locating one candidate object, and
//! accepts the first candidate that is structurally flat and free of
//! placeholder or example-data echo. When every strategy is exhausted
//! it fails closed; the caller falls back to an all-absent record
//! rather than surfacing template text as data.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::{empty_fields, RawFields};
use crate::signatures::{contains_template_text, is_contaminated};

/// Errors from response validation. Both variants are recoverable by
/// design; they differ only in what the diagnosis log should say.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// No extraction strategy produced structurally valid, flat JSON.
    #[error("could not extract structured data from model output")]
    ParseFailure,

    /// Structurally valid JSON was found but rejected because it echoes
    /// placeholder or example text.
    #[error("structured data rejected as contaminated: {reason}")]
    ContaminationDetected { reason: String },
}

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
    static ref TRAILING_COMMA_OBJECT: Regex = Regex::new(r",\s*\}").unwrap();
    static ref TRAILING_COMMA_ARRAY: Regex = Regex::new(r",\s*\]").unwrap();

    // Any value other than a scalar or null means the model invented
    // structure we did not ask for; the whole candidate is untrusted.
    static ref FLAT_OBJECT_SCHEMA: jsonschema::Validator = {
        let schema = serde_json::json!({
            "type": "object",
            "additionalProperties": {
                "type": ["string", "number", "boolean", "null"]
            }
        });
        jsonschema::validator_for(&schema).expect("flat object schema compiles")
    };
}

/// Ordered extraction strategies. Each yields at most one candidate;
/// the first accepted candidate wins.
const STRATEGIES: &[(&str, fn(&str) -> Option<String>)] = &[
    ("fenced_block", extract_fenced),
    ("keyed_object", extract_keyed),
    ("last_object", extract_last),
    ("widest_object", extract_widest),
];

/// Converts unstructured model text into a trustworthy flat field
/// mapping, or signals failure.
#[derive(Debug, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run the ordered strategies over raw model output.
    ///
    /// On success every key in [`crate::record::EXPECTED_FIELDS`] is
    /// present in the returned map; keys the candidate did not carry are
    /// filled with absence.
    pub fn validate(&self, raw: &str) -> Result<RawFields, ValidateError> {
        let mut rejection: Option<String> = None;

        for (name, strategy) in STRATEGIES {
            let Some(candidate) = strategy(raw) else {
                continue;
            };
            let repaired = repair(&candidate);

            let value: Value = match serde_json::from_str(&repaired) {
                Ok(value) => value,
                Err(err) => {
                    debug!(strategy = name, error = %err, "candidate failed to parse");
                    continue;
                }
            };
            let Some(object) = value.as_object() else {
                debug!(strategy = name, "candidate is not a JSON object");
                continue;
            };
            if !FLAT_OBJECT_SCHEMA.is_valid(&value) {
                debug!(strategy = name, "candidate has nested values");
                continue;
            }

            match screen(object) {
                Ok(fields) => {
                    info!(strategy = name, "accepted candidate");
                    return Ok(fields);
                }
                Err(reason) => {
                    warn!(strategy = name, %reason, "candidate rejected");
                    rejection = Some(reason);
                }
            }
        }

        match rejection {
            Some(reason) => Err(ValidateError::ContaminationDetected { reason }),
            None => Err(ValidateError::ParseFailure),
        }
    }
}

/// Run rejection checks over a parsed flat object, then intersect its
/// keys with the expected set.
fn screen(object: &Map<String, Value>) -> Result<RawFields, String> {
    for (key, value) in object {
        if let Value::String(text) = value {
            if contains_template_text(text) {
                return Err(format!("placeholder text under '{key}'"));
            }
        }
    }

    let mut fields = empty_fields();
    for (key, value) in object {
        let Some(canonical) = canonical_key(key) else {
            debug!(key, "dropping unexpected key");
            continue;
        };
        let scalar = match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Null => None,
            // Unreachable past the flat-shape check.
            Value::Object(_) | Value::Array(_) => None,
        };
        if let Some(text) = &scalar {
            if is_contaminated(canonical, text) {
                return Err(format!("example data echoed under '{canonical}'"));
            }
        }
        fields.insert(canonical, scalar);
    }

    Ok(fields)
}

/// Map produced key spellings onto the canonical key set. The model is
/// prompted with the canonical names but drifts toward synonyms it saw
/// in training data.
fn canonical_key(key: &str) -> Option<&'static str> {
    match key.trim().to_lowercase().as_str() {
        "first_name" => Some("first_name"),
        "last_name" => Some("last_name"),
        "dln" | "license_number" => Some("dln"),
        "date_of_birth" | "dob" | "birth_date" => Some("date_of_birth"),
        "expiration_date" | "expiry" | "exp_date" => Some("expiration_date"),
        "street_address" => Some("street_address"),
        "city" => Some("city"),
        "state" => Some("state"),
        "zip_code" => Some("zip_code"),
        "sex" | "gender" => Some("sex"),
        _ => None,
    }
}

/// Flatten newlines and strip trailing commas so near-JSON from a small
/// model still parses.
fn repair(candidate: &str) -> String {
    let flat = candidate.replace(['\r', '\n'], " ");
    let flat = TRAILING_COMMA_OBJECT.replace_all(&flat, "}");
    TRAILING_COMMA_ARRAY.replace_all(&flat, "]").into_owned()
}

/// Strategy 1: object inside a fenced code block.
fn extract_fenced(raw: &str) -> Option<String> {
    FENCED_BLOCK
        .captures(raw)
        .map(|caps| caps[1].to_string())
}

/// Strategy 2: first balanced object containing a `"first_name"` key.
fn extract_keyed(raw: &str) -> Option<String> {
    for (index, _) in raw.match_indices('{') {
        if let Some(span) = balanced_object(raw, index) {
            if span.contains("\"first_name\"") {
                return Some(span.to_string());
            }
        }
    }
    None
}

/// Strategy 3: balanced object that ends the text.
fn extract_last(raw: &str) -> Option<String> {
    for (index, _) in raw.match_indices('{') {
        if let Some(span) = balanced_object(raw, index) {
            let tail = &raw[index + span.len()..];
            if tail.trim().is_empty() {
                return Some(span.to_string());
            }
        }
    }
    None
}

/// Strategy 4: everything between the first `{` and the last `}`.
fn extract_widest(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(raw[start..=end].to_string())
}

/// Scan forward from an opening brace to its balanced close, skipping
/// braces inside string literals.
fn balanced_object(text: &str, open: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[open..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}
