/// Static keyword and character tables that drive lore selection.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const BUNDLED_RULES: &str = include_str!("../../lore_data/rules.ron");

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid rules: {0}")]
    Invalid(String),
}

/// A world-knowledge category: trigger keywords and the sections they pull in.
///
/// An empty keyword list means the category always applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
    pub sections: Vec<String>,
}

impl KeywordRule {
    pub fn always_applies(&self) -> bool {
        self.keywords.is_empty()
    }

    /// First keyword found in `text` as a literal, case-sensitive substring.
    pub fn first_hit(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| text.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

/// Display name as it appears in outlines, and the `## ` header of that
/// character's section in the character document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRule {
    pub name: String,
    pub header: String,
}

/// Size caps and heuristics applied while assembling a context package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    /// Max lines kept from one character section.
    pub character_lines: usize,
    /// Max lines kept from one world section.
    pub world_lines: usize,
    /// Line appended after a truncated section.
    pub elision_marker: String,
    /// Characters of the previous episode's ending carried over.
    pub previous_tail_chars: usize,
    /// Estimated tokens per character of context.
    pub tokens_per_char: f64,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            character_lines: 80,
            world_lines: 60,
            elision_marker: "[... 이하 생략]".to_string(),
            previous_tail_chars: 500,
            tokens_per_char: 1.5,
        }
    }
}

/// The full rule table. Loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct LoreRules {
    pub world: Vec<KeywordRule>,
    pub characters: Vec<CharacterRule>,
    /// Header used when no character name appears in the outline.
    pub default_character: String,
    pub limits: ExtractionLimits,
}

// The RON file lists characters as (name, header) pairs and categories as
// named `Category(...)` records, so it goes through intermediate structs.

#[derive(Debug, Deserialize)]
#[serde(rename = "Category")]
struct RonCategory {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
    sections: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "LoreRules")]
struct RonRules {
    world: Vec<RonCategory>,
    characters: Vec<(String, String)>,
    default_character: String,
    #[serde(default)]
    limits: ExtractionLimits,
}

impl LoreRules {
    /// The rule table compiled into the binary.
    pub fn bundled() -> Result<LoreRules, RulesError> {
        Self::parse_ron(BUNDLED_RULES)
    }

    /// Load a rule table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<LoreRules, RulesError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a rule table from a RON string.
    pub fn parse_ron(input: &str) -> Result<LoreRules, RulesError> {
        let raw: RonRules = ron::from_str(input)?;

        if raw.default_character.trim().is_empty() {
            return Err(RulesError::Invalid(
                "default_character must not be empty".to_string(),
            ));
        }
        if let Some(category) = raw.world.iter().find(|c| c.sections.is_empty()) {
            return Err(RulesError::Invalid(format!(
                "category '{}' has no sections",
                category.name
            )));
        }

        let world = raw
            .world
            .into_iter()
            .map(|c| KeywordRule {
                category: c.name,
                keywords: c.keywords,
                sections: c.sections,
            })
            .collect();
        let characters = raw
            .characters
            .into_iter()
            .map(|(name, header)| CharacterRule { name, header })
            .collect();

        Ok(LoreRules {
            world,
            characters,
            default_character: raw.default_character,
            limits: raw.limits,
        })
    }
}
