//! Extraction prompt for the field-extraction model.
//!
//! The skeleton deliberately mirrors the template wording the core
//! validator knows how to reject: when the model echoes the skeleton
//! instead of extracting, the echo is caught downstream. The skeleton
//! stays flat; a nested value in the reply would trip the validator's
//! own shape rule.

/// OCR text is truncated to this many characters before prompting; a
/// license never needs more and the 1B model loses the instruction in
/// long contexts.
pub const MAX_OCR_CHARS: usize = 800;

/// Build the llama-3 chat-format extraction prompt for one document.
pub fn extraction_prompt(ocr_text: &str) -> String {
    let trimmed = truncate_chars(ocr_text, MAX_OCR_CHARS);
    format!(
        r#"<|begin_of_text|><|start_header_id|>system<|end_header_id|>
You are a data extraction assistant. Extract driver's license information from OCR text and return ONLY valid JSON. No explanations, no extra text.<|eot_id|><|start_header_id|>user<|end_header_id|>
Extract the following fields from this driver's license OCR text:

{trimmed}

Return ONLY this JSON structure (use null for missing fields):
{{
  "first_name": "string or null",
  "last_name": "string or null",
  "dln": "string or null",
  "date_of_birth": "MM/DD/YYYY or null",
  "expiration_date": "MM/DD/YYYY or null",
  "street_address": "string or null",
  "city": "string or null",
  "state": "2-letter code or null",
  "zip_code": "string or null",
  "sex": "M or F or null"
}}<|eot_id|><|start_header_id|>assistant<|end_header_id|>
"#
    )
}

/// Truncate at a character boundary, never mid-codepoint.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_ocr_text_and_keys() {
        let prompt = extraction_prompt("1 JOHN\n2 DOE SMITH\n3 DOB 01/15/1985");
        assert!(prompt.contains("1 JOHN"));
        for key in dlx_core::EXPECTED_FIELDS {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }

    #[test]
    fn test_prompt_skeleton_is_flat() {
        // Exactly one object open/close pair in the skeleton.
        let prompt = extraction_prompt("");
        assert_eq!(prompt.matches('{').count(), 1);
        assert_eq!(prompt.matches('}').count(), 1);
    }

    #[test]
    fn test_long_ocr_text_is_truncated() {
        let long = "x".repeat(5000);
        let prompt = extraction_prompt(&long);
        assert!(!prompt.contains(&"x".repeat(MAX_OCR_CHARS + 1)));
        assert!(prompt.contains(&"x".repeat(MAX_OCR_CHARS)));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(1000);
        let truncated = truncate_chars(&text, MAX_OCR_CHARS);
        assert_eq!(truncated.chars().count(), MAX_OCR_CHARS);
    }
}
