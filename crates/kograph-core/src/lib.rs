//! kograph Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout kograph:
//! - Entity / relation data model and the extraction result
//! - Common error types
//! - The text-generation trait implemented by LLM backends
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, LlmConfig, LlmProvider, LoggingConfig, OutputConfig};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for kograph operations
#[derive(Error, Debug)]
pub enum KographError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for KographError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KographError>;

// ============================================================================
// Entity Types
// ============================================================================

/// Closed set of entity types.
///
/// Anything an external source reports outside this set is coerced to
/// [`EntityType::Other`] so that every entity can be coloured and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Event,
    Product,
    Other,
}

impl EntityType {
    /// All types, in canonical order
    pub const ALL: [EntityType; 6] = [
        Self::Person,
        Self::Organization,
        Self::Location,
        Self::Event,
        Self::Product,
        Self::Other,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Organization => "ORGANIZATION",
            Self::Location => "LOCATION",
            Self::Event => "EVENT",
            Self::Product => "PRODUCT",
            Self::Other => "OTHER",
        }
    }

    /// Parse a type label, coercing anything unrecognized to `Other`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "PERSON" => Self::Person,
            "ORGANIZATION" | "ORGANISATION" => Self::Organization,
            "LOCATION" => Self::Location,
            "EVENT" => Self::Event,
            "PRODUCT" => Self::Product,
            _ => Self::Other,
        }
    }

    /// Korean gloss used in prompts
    pub fn description_ko(&self) -> &'static str {
        match self {
            Self::Person => "사람, 인물",
            Self::Organization => "회사, 정부, 기관, 단체 등",
            Self::Location => "국가, 도시, 지역 등",
            Self::Event => "행사, 사건, 회의 등",
            Self::Product => "제품, 서비스, 기술 등",
            Self::Other => "기타 중요 개체",
        }
    }

    /// Fixed render colour (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Self::Person => "#3498db",
            Self::Organization => "#2ecc71",
            Self::Location => "#e74c3c",
            Self::Event => "#f39c12",
            Self::Product => "#9b59b6",
            Self::Other => "#7f8c8d",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

// ============================================================================
// Extraction Models
// ============================================================================

/// A named thing found in the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier, unique within one extraction
    pub id: String,

    /// Surface string as it appears in the text
    pub name: String,

    #[serde(rename = "type")]
    pub entity_type: EntityType,

    #[serde(default)]
    pub description: String,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: EntityType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
            description: description.into(),
        }
    }
}

/// A labeled, directed link between two entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Source entity id
    pub source: String,

    /// Target entity id
    pub target: String,

    /// Free-text relation label
    pub relation: String,

    /// Evidence sentence, may be empty
    #[serde(default)]
    pub sentence: String,
}

impl Relation {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
        sentence: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            sentence: sentence.into(),
        }
    }
}

/// Entities and relations produced by one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub entities: Vec<Entity>,

    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl ExtractionResult {
    pub fn new(entities: Vec<Entity>, relations: Vec<Relation>) -> Self {
        Self {
            entities,
            relations,
        }
    }

    /// Result with no entities and no relations
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    /// Look up an entity by id
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Check that no two entities share an id
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.entities.iter().all(|e| seen.insert(e.id.as_str()))
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Text-generation capability backing the LLM extractor
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================
