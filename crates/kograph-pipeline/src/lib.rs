//! kograph Pipeline - Extraction orchestrator
//!
//! Chooses an extraction strategy from configuration, runs it on one text,
//! and packages the result with its tables, JSON Lines, JSON document, and
//! graph summary. A run never returns an error: a run that finds no entities
//! is reported as a failed [`PipelineOutcome`] with a message.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use kograph_core::{Entity, ExtractionResult, KographError, LlmConfig, Relation, Result};
use kograph_export::{Artifacts, ArtifactKind, ExtractionTables, FileSink, GraphSummary};
use kograph_extractor::{Extractor, LlmExtractor, RuleBasedExtractor};

/// Built-in Korean news-style passage for demos and smoke tests
pub const SAMPLE_TEXT: &str = include_str!("sample_news.txt");

/// Message of a run that produced no entities
pub const NO_ENTITIES_MESSAGE: &str = "개체 추출에 실패했습니다";

// ============================================================================
// Strategy selection
// ============================================================================

/// Which extractor a pipeline should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    /// LLM when a credential is configured, rules otherwise
    #[default]
    Auto,
    /// LLM only; a missing credential is a construction error
    Llm,
    Rules,
}

impl std::str::FromStr for StrategyChoice {
    type Err = KographError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "llm" => Ok(Self::Llm),
            "rules" | "rule" => Ok(Self::Rules),
            other => Err(KographError::Config(format!(
                "unknown strategy '{}', expected auto, llm, or rules",
                other
            ))),
        }
    }
}

impl std::fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Llm => "llm",
            Self::Rules => "rules",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Everything one pipeline run produces
///
/// Tables and serializations are always present; on failure they are the
/// zero-row, full-schema forms.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub success: bool,
    /// Name of the extractor that ran ("llm" or "rules")
    pub strategy: &'static str,
    pub result: ExtractionResult,
    pub tables: ExtractionTables,
    pub jsonl: String,
    pub document: String,
    pub summary: GraphSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PipelineOutcome {
    fn succeeded(strategy: &'static str, result: ExtractionResult, artifacts: Artifacts) -> Self {
        Self {
            success: true,
            strategy,
            result,
            tables: artifacts.tables,
            jsonl: artifacts.jsonl,
            document: artifacts.document,
            summary: artifacts.summary,
            message: None,
        }
    }

    fn failed(strategy: &'static str, message: impl Into<String>) -> Self {
        let artifacts = Artifacts::empty();
        Self {
            success: false,
            strategy,
            result: ExtractionResult::empty(),
            tables: artifacts.tables,
            jsonl: artifacts.jsonl,
            document: artifacts.document,
            summary: artifacts.summary,
            message: Some(message.into()),
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.result.entities
    }

    pub fn relations(&self) -> &[Relation] {
        &self.result.relations
    }

    /// Write the artifacts of a successful run into `dir`
    ///
    /// A failed outcome writes nothing, so files from an earlier successful
    /// run stay untouched.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<BTreeMap<ArtifactKind, PathBuf>> {
        if !self.success {
            return Err(KographError::Validation(format!(
                "refusing to save a failed extraction: {}",
                self.message.as_deref().unwrap_or(NO_ENTITIES_MESSAGE)
            )));
        }

        FileSink::new(dir.as_ref()).write(&self.tables, &self.jsonl, &self.document)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Text in, knowledge-graph outcome out
pub struct KnowledgeGraphPipeline {
    extractor: Extractor,
}

impl KnowledgeGraphPipeline {
    /// Create a pipeline, selecting the strategy from configuration
    ///
    /// Fails only when [`StrategyChoice::Llm`] is requested and no usable
    /// LLM client can be built.
    pub fn new(config: &LlmConfig, choice: StrategyChoice) -> Result<Self> {
        let extractor: Extractor = match choice {
            StrategyChoice::Rules => RuleBasedExtractor::new().into(),
            StrategyChoice::Llm => {
                let client = kograph_llm::create_llm_client(config)?;
                LlmExtractor::new(client).into()
            }
            StrategyChoice::Auto if config.has_credential() => {
                match kograph_llm::create_llm_client(config) {
                    Ok(client) => LlmExtractor::new(client).into(),
                    Err(e) => {
                        tracing::warn!("LLM client unavailable, using rules: {}", e);
                        RuleBasedExtractor::new().into()
                    }
                }
            }
            StrategyChoice::Auto => {
                tracing::debug!("No API key configured, using rule-based extraction");
                RuleBasedExtractor::new().into()
            }
        };

        Ok(Self::with_extractor(extractor))
    }

    /// Create a pipeline around an already-built extractor
    pub fn with_extractor(extractor: impl Into<Extractor>) -> Self {
        Self {
            extractor: extractor.into(),
        }
    }

    pub fn strategy(&self) -> &'static str {
        self.extractor.name()
    }

    /// Extract, then assemble tables and serializations
    pub async fn run(&self, text: &str) -> PipelineOutcome {
        let strategy = self.strategy();
        tracing::info!(strategy, chars = text.chars().count(), "Starting extraction");

        let result = self.extractor.extract(text).await;

        if result.entities.is_empty() {
            tracing::warn!(strategy, "Extraction produced no entities");
            return PipelineOutcome::failed(strategy, NO_ENTITIES_MESSAGE);
        }

        match Artifacts::from_result(&result) {
            Ok(artifacts) => {
                tracing::info!(
                    strategy,
                    entities = result.entities.len(),
                    relations = result.relations.len(),
                    "Extraction complete"
                );
                PipelineOutcome::succeeded(strategy, result, artifacts)
            }
            Err(e) => {
                tracing::error!("Failed to serialize extraction: {}", e);
                PipelineOutcome::failed(strategy, format!("결과 직렬화에 실패했습니다: {}", e))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_config() -> LlmConfig {
        LlmConfig {
            api_key: Some("test-key".to_string()),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("auto".parse::<StrategyChoice>().unwrap(), StrategyChoice::Auto);
        assert_eq!("LLM".parse::<StrategyChoice>().unwrap(), StrategyChoice::Llm);
        assert_eq!(" rules ".parse::<StrategyChoice>().unwrap(), StrategyChoice::Rules);
        assert!("magic".parse::<StrategyChoice>().is_err());
        assert_eq!(StrategyChoice::default().to_string(), "auto");
    }

    #[test]
    fn test_auto_without_key_uses_rules() {
        let pipeline = KnowledgeGraphPipeline::new(&LlmConfig::default(), StrategyChoice::Auto).unwrap();
        assert_eq!(pipeline.strategy(), "rules");
    }

    #[test]
    fn test_auto_with_key_uses_llm() {
        let pipeline = KnowledgeGraphPipeline::new(&keyed_config(), StrategyChoice::Auto).unwrap();
        assert_eq!(pipeline.strategy(), "llm");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };
        let pipeline = KnowledgeGraphPipeline::new(&config, StrategyChoice::Auto).unwrap();
        assert_eq!(pipeline.strategy(), "rules");
    }

    #[test]
    fn test_explicit_llm_requires_key() {
        let err = KnowledgeGraphPipeline::new(&LlmConfig::default(), StrategyChoice::Llm)
            .err()
            .unwrap();
        assert!(matches!(err, KographError::Config(_)));
    }

    #[test]
    fn test_rules_ignores_key() {
        let pipeline = KnowledgeGraphPipeline::new(&keyed_config(), StrategyChoice::Rules).unwrap();
        assert_eq!(pipeline.strategy(), "rules");
    }

    #[tokio::test]
    async fn test_sample_text_extracts_with_rules() {
        let pipeline = KnowledgeGraphPipeline::with_extractor(RuleBasedExtractor::new());
        let outcome = pipeline.run(SAMPLE_TEXT).await;

        assert!(outcome.success);
        assert!(outcome.entities().iter().any(|e| e.name == "김민수"));
        assert!(!outcome.relations().is_empty());
        assert_eq!(outcome.tables.entities.len(), outcome.entities().len());
        assert_eq!(outcome.summary.node_count, outcome.entities().len());
    }

    #[test]
    fn test_failed_outcome_serializes_message() {
        let outcome = PipelineOutcome::failed("rules", NO_ENTITIES_MESSAGE);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], NO_ENTITIES_MESSAGE);
        assert_eq!(json["jsonl"], "");
    }
}
