//! kograph Extractor - Knowledge extraction strategies
//!
//! Turns raw Korean text into an [`ExtractionResult`] using one of two
//! interchangeable strategies:
//! - Rule-based: suffix patterns for persons, organizations, and locations
//! - LLM-based: a structured-output prompt sent to a generation backend
//!
//! Which strategy runs is decided by the caller, not here.

use kograph_core::ExtractionResult;

pub mod llm;
pub mod response;
pub mod rules;

pub use llm::{LlmExtractor, LlmExtractorConfig};
pub use response::parse_response;
pub use rules::RuleBasedExtractor;

/// The extraction strategy chosen for a run
pub enum Extractor {
    Llm(LlmExtractor),
    Rules(RuleBasedExtractor),
}

impl Extractor {
    /// Short strategy name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Llm(_) => "llm",
            Self::Rules(_) => "rules",
        }
    }

    /// Run the strategy. Neither variant fails: the worst case is an empty result.
    pub async fn extract(&self, text: &str) -> ExtractionResult {
        match self {
            Self::Llm(extractor) => extractor.extract(text).await,
            Self::Rules(extractor) => extractor.extract(text),
        }
    }
}

impl From<RuleBasedExtractor> for Extractor {
    fn from(extractor: RuleBasedExtractor) -> Self {
        Self::Rules(extractor)
    }
}

impl From<LlmExtractor> for Extractor {
    fn from(extractor: LlmExtractor) -> Self {
        Self::Llm(extractor)
    }
}
