//! Extraction pipeline: model first, regex fallback second.
//!
//! One document goes through at most three stages. The model reply is
//! validated and normalized by `dlx-core`; any rejection there, or any
//! provider failure, drops to the regex extractor over the raw OCR
//! text; if that finds nothing either, the outcome is an all-absent
//! record. Every path produces a record and a validation report, so
//! callers never branch on failure shape.

use serde::Serialize;
use tracing::{debug, info, warn};

use dlx_core::{normalize_fields, FieldRecord, ValidationReport};

use crate::prompt::{extraction_prompt, truncate_chars};
use crate::providers::{GenerationConfig, LlmProvider};
use crate::regex_fallback::RegexExtractor;

/// How many characters of the raw model reply the outcome keeps for
/// diagnostics.
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Which stage produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Validated and normalized model output.
    Model,

    /// Regex extraction straight from the OCR text.
    RegexFallback,

    /// Nothing usable anywhere; every field is absent.
    Empty,
}

/// Result of running one document through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    /// Normalized record, possibly with absent fields.
    pub record: FieldRecord,

    /// Field-level validation findings for the record.
    pub report: ValidationReport,

    /// Stage that produced the record.
    pub source: FieldSource,

    /// Truncated raw model reply, kept for diagnostics when the model
    /// was reached at all.
    pub model_response: Option<String>,
}

/// Extraction pipeline over a model provider.
pub struct ExtractionPipeline<P> {
    provider: P,
    config: GenerationConfig,
    fallback: RegexExtractor,
}

impl<P: LlmProvider> ExtractionPipeline<P> {
    /// Build a pipeline with the default generation config.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, GenerationConfig::default())
    }

    /// Build a pipeline with an explicit generation config.
    pub fn with_config(provider: P, config: GenerationConfig) -> Self {
        Self {
            provider,
            config,
            fallback: RegexExtractor::new(),
        }
    }

    /// Run one document's OCR text through the pipeline.
    pub async fn process(&self, ocr_text: &str) -> ExtractionOutcome {
        let prompt = extraction_prompt(ocr_text);

        let model_response = match self.provider.generate(&prompt, &self.config).await {
            Ok(reply) => Some(reply),
            Err(err) => {
                warn!(provider = self.provider.name(), error = %err, "model call failed");
                None
            }
        };

        if let Some(reply) = &model_response {
            match dlx_core::extract(reply) {
                Ok(record) => {
                    let report = ValidationReport::for_record(&record);
                    info!(
                        fields = record.present_count(),
                        clean = report.is_clean(),
                        "model extraction accepted"
                    );
                    return ExtractionOutcome {
                        record,
                        report,
                        source: FieldSource::Model,
                        model_response: preview(reply),
                    };
                }
                Err(err) => {
                    warn!(error = %err, "model reply rejected, trying regex fallback");
                }
            }
        }

        let record = normalize_fields(&self.fallback.extract(ocr_text));
        let source = if record.present_count() > 0 {
            FieldSource::RegexFallback
        } else {
            FieldSource::Empty
        };
        debug!(fields = record.present_count(), ?source, "fallback extraction finished");

        let report = ValidationReport::for_record(&record);
        ExtractionOutcome {
            record,
            report,
            source,
            model_response: model_response.as_deref().and_then(preview),
        }
    }
}

fn preview(reply: &str) -> Option<String> {
    Some(truncate_chars(reply, RESPONSE_PREVIEW_CHARS).to_string())
}
