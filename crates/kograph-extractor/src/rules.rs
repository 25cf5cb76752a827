//! Rule-based extraction
//!
//! Deterministic fallback used when no model credential is available.
//! Entities are found with suffix patterns (title, institution, and
//! administrative-unit suffixes); relations are generated between every
//! pair of known entities that co-occur in a sentence.

use std::collections::HashSet;

use regex::Regex;

use kograph_core::{Entity, EntityType, ExtractionResult, Relation};

// ============================================================================
// Pattern definitions
// ============================================================================

/// Honorifics and titles that follow a person's name.
/// Longer titles come first so that e.g. 부사장 wins over 사장.
const PERSON_TITLES: &[&str] = &[
    "교수", "박사", "부회장", "회장", "부사장", "사장", "대표", "상무", "전무", "장관", "차관",
    "의원", "위원장", "원장", "총장", "국장", "소장", "감독", "대통령", "총리", "변호사",
];

/// Institutional suffixes
const ORGANIZATION_SUFFIXES: &[&str] = &[
    "대학교", "대학원", "대학", "연구소", "위원회", "협회", "학회", "재단", "센터", "그룹",
    "회사", "전자", "은행", "병원", "학과",
];

/// Administrative-unit suffixes
const LOCATION_SUFFIXES: &[&str] = &["특별시", "광역시", "시", "도", "군", "구", "동", "국"];

/// Terminal punctuation followed by whitespace ends a sentence
const SENTENCE_BOUNDARY: &str = r"[.!?]\s+";

/// Relation label for an ordered pair of entity types
pub fn relation_label(source: EntityType, target: EntityType) -> &'static str {
    use EntityType::*;

    match (source, target) {
        (Person, Organization) => "affiliation",
        (Organization, Person) => "employs",
        (Person, Person) => "collaboration",
        (Organization, Organization) => "partnership",
        (Location, _) | (_, Location) => "location",
        _ => "related",
    }
}

// ============================================================================
// Rule-based extractor
// ============================================================================

/// Rule-based extractor using suffix patterns and sentence co-occurrence
pub struct RuleBasedExtractor {
    /// One pattern per entity family, applied in order (precedence for dedup)
    patterns: Vec<(Regex, EntityType)>,
    /// Sentence splitter
    sentence_boundary: Option<Regex>,
}

impl RuleBasedExtractor {
    /// Create a new extractor with the default Korean patterns
    pub fn new() -> Self {
        let mut extractor = Self {
            patterns: Vec::new(),
            sentence_boundary: Regex::new(SENTENCE_BOUNDARY).ok(),
        };

        extractor.init_patterns();
        extractor
    }

    /// Initialize the three pattern families: PERSON, ORGANIZATION, LOCATION
    fn init_patterns(&mut self) {
        self.add_pattern(
            &format!(r"([가-힣]{{2,4}})\s?(?:{})", PERSON_TITLES.join("|")),
            EntityType::Person,
        );
        self.add_pattern(
            &format!(
                r"([가-힣A-Za-z0-9]+)(?:{})",
                ORGANIZATION_SUFFIXES.join("|")
            ),
            EntityType::Organization,
        );
        self.add_pattern(
            &format!(r"([가-힣]{{2,}})(?:{})", LOCATION_SUFFIXES.join("|")),
            EntityType::Location,
        );
    }

    /// Add a regex pattern; group 1 must capture the name
    fn add_pattern(&mut self, pattern: &str, entity_type: EntityType) {
        match Regex::new(pattern) {
            Ok(regex) => self.patterns.push((regex, entity_type)),
            Err(e) => tracing::warn!("Skipping invalid {} pattern: {}", entity_type, e),
        }
    }

    /// Extract entities and relations from text
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let entities = self.extract_entities(text);
        let relations = self.extract_relations(text, &entities);

        tracing::debug!(
            entities = entities.len(),
            relations = relations.len(),
            "Rule-based extraction finished"
        );

        ExtractionResult::new(entities, relations)
    }

    /// Find entities, first surface name wins across all families
    pub fn extract_entities(&self, text: &str) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (regex, entity_type) in &self.patterns {
            for caps in regex.captures_iter(text) {
                let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                    continue;
                };
                if name.is_empty() || !seen.insert(name.to_string()) {
                    continue;
                }

                let id = format!("E{}", entities.len() + 1);
                entities.push(Entity::new(
                    id,
                    name,
                    *entity_type,
                    format!("{name} is an entity of type {entity_type}."),
                ));
            }
        }

        entities
    }

    /// Pair up entities that share a sentence
    ///
    /// Members of a sentence are taken in discovery order, not by position in
    /// the sentence; each unordered pair yields one relation.
    pub fn extract_relations(&self, text: &str, entities: &[Entity]) -> Vec<Relation> {
        let mut relations = Vec::new();

        for sentence in self.split_sentences(text) {
            let members: Vec<&Entity> = entities
                .iter()
                .filter(|e| sentence.contains(e.name.as_str()))
                .collect();

            for (i, source) in members.iter().enumerate() {
                for target in &members[i + 1..] {
                    relations.push(Relation::new(
                        &source.id,
                        &target.id,
                        relation_label(source.entity_type, target.entity_type),
                        sentence,
                    ));
                }
            }
        }

        relations
    }

    /// Split on terminal punctuation followed by whitespace; the punctuation
    /// stays with its sentence.
    pub fn split_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        if let Some(boundary) = &self.sentence_boundary {
            for mat in boundary.find_iter(text) {
                // punctuation is a single ASCII byte
                sentences.push(text[start..mat.start() + 1].trim());
                start = mat.end();
            }
        }
        sentences.push(text[start..].trim());

        sentences.retain(|s| !s.is_empty());
        sentences
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names(result: &ExtractionResult) -> Vec<&str> {
        result.entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_person_with_title() {
        let extractor = RuleBasedExtractor::new();
        let result = extractor.extract("김민수 교수가 서울대학교에서 강연했다.");

        let person = &result.entities[0];
        assert_eq!(person.id, "E1");
        assert_eq!(person.name, "김민수");
        assert_eq!(person.entity_type, EntityType::Person);
        assert_eq!(person.description, "김민수 is an entity of type PERSON.");
    }

    #[test]
    fn test_organization_suffix_is_discarded() {
        let extractor = RuleBasedExtractor::new();
        let result = extractor.extract("김민수 교수가 서울대학교에서 강연했다.");

        assert_eq!(result.entities.len(), 2);
        let org = &result.entities[1];
        assert_eq!(org.id, "E2");
        assert_eq!(org.entity_type, EntityType::Organization);
        assert_eq!(org.name, "서울");
    }

    #[test]
    fn test_longer_title_preferred() {
        let extractor = RuleBasedExtractor::new();
        let entities = extractor.extract_entities("네이버의 이기획 부사장은 서비스를 소개했다.");

        assert_eq!(entities[0].name, "이기획");
        assert_eq!(entities[0].entity_type, EntityType::Person);
    }

    #[test]
    fn test_location_suffix() {
        let extractor = RuleBasedExtractor::new();
        let result = extractor.extract("서울 강남구에서 열린 기술 컨퍼런스");

        assert_eq!(names(&result), vec!["강남"]);
        assert_eq!(result.entities[0].entity_type, EntityType::Location);
    }

    #[test]
    fn test_single_syllable_location_is_ignored() {
        let extractor = RuleBasedExtractor::new();
        // 공동, 반도체, 한국, 연구 end in a location suffix after one syllable
        let entities =
            extractor.extract_entities("삼성전자와 네이버가 공동 주최했으며 반도체 기술을 한국에서 연구했다.");

        assert!(entities
            .iter()
            .all(|e| e.entity_type != EntityType::Location));
        assert!(entities.iter().all(|e| e.name.chars().count() >= 2));
    }

    #[test]
    fn test_no_match() {
        let extractor = RuleBasedExtractor::new();
        let result = extractor.extract("오늘은 날씨가 좋다.");

        assert!(result.entities.is_empty());
        assert!(result.relations.is_empty());
    }

    #[test]
    fn test_dedup_first_family_wins() {
        let extractor = RuleBasedExtractor::new();
        // "김민수" is a PERSON (교수) and an ORGANIZATION (재단) match
        let result = extractor.extract("김민수 교수는 김민수재단을 세웠다.");

        let matches: Vec<&Entity> = result
            .entities
            .iter()
            .filter(|e| e.name == "김민수")
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].entity_type, EntityType::Person);
    }

    #[test]
    fn test_relation_labels() {
        use EntityType::*;

        assert_eq!(relation_label(Person, Organization), "affiliation");
        assert_eq!(relation_label(Organization, Person), "employs");
        assert_eq!(relation_label(Person, Person), "collaboration");
        assert_eq!(relation_label(Organization, Organization), "partnership");
        assert_eq!(relation_label(Location, Person), "location");
        assert_eq!(relation_label(Organization, Location), "location");
        assert_eq!(relation_label(Event, Product), "related");
    }

    #[test]
    fn test_relation_sentence_and_direction() {
        let extractor = RuleBasedExtractor::new();
        let text = "김민수 교수가 서울대학교에서 강연했다.";
        let result = extractor.extract(text);

        assert_eq!(result.relations.len(), 1);
        let relation = &result.relations[0];
        assert_eq!(relation.source, "E1");
        assert_eq!(relation.target, "E2");
        assert_eq!(relation.relation, "affiliation");
        assert_eq!(relation.sentence, text);
    }

    #[test]
    fn test_pairs_follow_discovery_order() {
        let extractor = RuleBasedExtractor::new();
        // PERSON family runs first, so 김민수 (E1) is the source even though
        // the organization appears earlier in the sentence.
        let result = extractor.extract("삼성전자에서 김민수 교수가 발표했다.");

        assert_eq!(names(&result), vec!["김민수", "삼성"]);
        assert_eq!(result.relations[0].source, "E1");
        assert_eq!(result.relations[0].relation, "affiliation");
    }

    #[test]
    fn test_three_entities_in_sentence() {
        let extractor = RuleBasedExtractor::new();
        let result = extractor.extract("김민수 교수와 이기획 부사장이 삼성전자에서 만났다.");

        assert_eq!(result.entities.len(), 3);
        assert_eq!(result.relations.len(), 3);
        assert_eq!(result.relations[0].relation, "collaboration");
    }

    #[test]
    fn test_split_sentences() {
        let extractor = RuleBasedExtractor::new();
        let sentences = extractor.split_sentences("첫 문장입니다. 둘째인가요?  셋째!\n마지막");

        assert_eq!(
            sentences,
            vec!["첫 문장입니다.", "둘째인가요?", "셋째!", "마지막"]
        );
        assert!(extractor.split_sentences("   ").is_empty());
    }

    #[test]
    fn test_relations_only_within_sentence() {
        let extractor = RuleBasedExtractor::new();
        let result = extractor.extract("김민수 교수가 강연했다. 삼성전자가 후원했다.");

        assert_eq!(result.entities.len(), 2);
        assert!(result.relations.is_empty());
    }
}
