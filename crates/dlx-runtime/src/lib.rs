//! # dlx-runtime
//!
//! Model-facing extraction runtime for dlx.
//!
//! This crate owns everything that touches a model or raw OCR text:
//! the prompt, the provider abstraction, the regex fallback, and the
//! pipeline that wires them together. Everything downstream of the raw
//! model reply is deterministic and lives in `dlx-core`.
//!
//! ## Important
//!
//! The pipeline never fails outward. A provider error or a rejected
//! model reply degrades to regex extraction over the OCR text, and
//! that in turn degrades to an all-absent record. Callers always get
//! a record, a report, and the stage that produced them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dlx_runtime::{ExtractionPipeline, FieldSource, OllamaProvider};
//!
//! let pipeline = ExtractionPipeline::new(OllamaProvider::new());
//! let outcome = pipeline.process(ocr_text).await;
//!
//! if outcome.source == FieldSource::Model {
//!     println!("{:?}", outcome.record);
//! }
//! ```

pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod regex_fallback;

pub use pipeline::{ExtractionOutcome, ExtractionPipeline, FieldSource};
pub use prompt::{extraction_prompt, MAX_OCR_CHARS};
pub use providers::{GenerationConfig, LlmProvider, ProviderError};
pub use regex_fallback::RegexExtractor;

#[cfg(feature = "ollama")]
pub use providers::OllamaProvider;
