//! LLM-backed extraction
//!
//! Builds a Korean structured-output prompt, calls the generation backend
//! once, and parses whatever comes back. Failures never escape: a failed
//! call or an unparseable response degrades to an empty result and is
//! reported through `tracing`.

use kograph_core::{EntityType, ExtractionResult, LlmClient};

use crate::response::parse_response;

/// Configuration for the LLM extractor
#[derive(Debug, Clone)]
pub struct LlmExtractorConfig {
    /// Instructions placed before everything else
    pub system_prompt: String,
    /// Expected JSON shape, with an example
    pub response_format: String,
    /// Entity types offered to the model
    pub entity_types: Vec<EntityType>,
}

impl Default for LlmExtractorConfig {
    fn default() -> Self {
        Self {
            system_prompt: include_str!("prompts/extraction_system.txt").to_string(),
            response_format: include_str!("prompts/response_format.txt").to_string(),
            entity_types: EntityType::ALL.to_vec(),
        }
    }
}

/// Extractor that delegates to a language model
pub struct LlmExtractor {
    client: Box<dyn LlmClient>,
    pub config: LlmExtractorConfig,
}

impl LlmExtractor {
    /// Create a new LLM extractor with the default prompt
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self::with_config(client, LlmExtractorConfig::default())
    }

    /// Create with custom config
    pub fn with_config(client: Box<dyn LlmClient>, config: LlmExtractorConfig) -> Self {
        Self { client, config }
    }

    /// Build the extraction prompt; the input text is embedded verbatim
    pub fn build_prompt(&self, text: &str) -> String {
        let entity_types: Vec<String> = self
            .config
            .entity_types
            .iter()
            .map(|t| format!("- {}: {}", t.as_str(), t.description_ko()))
            .collect();

        format!(
            "{}\n개체 유형은 다음과 같이 분류해주세요:\n{}\n\n{}\n분석할 텍스트:\n---\n{}\n---\n\n중요: 응답은 반드시 위에 명시된 JSON 형식만 포함해야 합니다. 다른 텍스트나 설명은 포함하지 마세요.\n",
            self.config.system_prompt,
            entity_types.join("\n"),
            self.config.response_format,
            text
        )
    }

    /// Extract entities and relations; never fails
    pub async fn extract(&self, text: &str) -> ExtractionResult {
        let prompt = self.build_prompt(text);

        let response = match self.client.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("LLM extraction call failed: {}", e);
                return ExtractionResult::empty();
            }
        };

        match parse_response(&response) {
            Ok(result) => {
                tracing::debug!(
                    entities = result.entities.len(),
                    relations = result.relations.len(),
                    "LLM extraction parsed"
                );
                result
            }
            Err(e) => {
                tracing::warn!("Could not parse LLM response: {}", e);
                ExtractionResult::empty()
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
    use kograph_core::{KographError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedClient {
        reply: std::result::Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(KographError::Llm)
        }
    }

    fn extractor(reply: std::result::Result<&str, &str>) -> (LlmExtractor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = ScriptedClient {
            reply: reply.map(str::to_string).map_err(str::to_string),
            calls: calls.clone(),
        };
        (LlmExtractor::new(Box::new(client)), calls)
    }

    #[test]
    fn test_prompt_embeds_text_and_types() {
        let (extractor, _) = extractor(Ok("{}"));
        let prompt = extractor.build_prompt("김민수 교수가 강연했다.");

        assert!(prompt.contains("---\n김민수 교수가 강연했다.\n---"));
        for ty in EntityType::ALL {
            assert!(prompt.contains(ty.as_str()));
        }
        assert!(prompt.contains("\"relations\""));
        assert!(prompt.contains("\"sentence\""));
    }

    #[tokio::test]
    async fn test_fenced_response() {
        let (extractor, calls) = extractor(Ok(
            "```json\n{\"entities\": [{\"id\": \"E1\", \"name\": \"네이버\", \"type\": \"ORGANIZATION\"}]}\n```",
        ));
        let result = extractor.extract("네이버").await;

        assert_eq!(result.entities.len(), 1);
        assert!(result.relations.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_failure_degrades_to_empty() {
        let (extractor, calls) = extractor(Err("rate limited"));
        let result = extractor.extract("네이버").await;

        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_garbage_response_degrades_to_empty() {
        let (extractor, _) = extractor(Ok("I cannot help with that."));
        assert!(extractor.extract("네이버").await.is_empty());
    }
}
