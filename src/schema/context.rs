/// Context package types: the per-episode bundle handed to drafting.
use serde::{Deserialize, Serialize};

use super::episode::EpisodeTag;

/// One episode's outline block, pulled from the outline document.
///
/// Every field is empty rather than absent when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineBlock {
    pub outline: String,
    pub title: String,
    pub prev_ending_hook: String,
}

/// Which optional parts of the package ended up non-empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionsIncluded {
    pub outline: bool,
    pub prev_ending_hook: bool,
    pub characters: bool,
    pub world: bool,
    pub previous_ending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMeta {
    pub total_chars: usize,
    pub estimated_tokens: usize,
    pub sections_included: SectionsIncluded,
}

/// The assembled context for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPackage {
    pub episode: String,
    pub ep_number: u32,
    pub ep_title: String,
    pub outline: String,
    pub prev_ending_hook: String,
    pub characters: String,
    pub world: String,
    pub style_guide: String,
    pub previous_ending: String,
    #[serde(rename = "_meta")]
    pub meta: ContextMeta,
}

impl ContextPackage {
    /// Build a package from its parts and compute the metadata block.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tag: EpisodeTag,
        block: OutlineBlock,
        characters: String,
        world: String,
        style_guide: String,
        previous_ending: String,
        tokens_per_char: f64,
    ) -> Self {
        let mut package = Self {
            episode: tag.to_string(),
            ep_number: tag.number(),
            ep_title: block.title,
            outline: block.outline,
            prev_ending_hook: block.prev_ending_hook,
            characters,
            world,
            style_guide,
            previous_ending,
            meta: ContextMeta::default(),
        };
        let total_chars = package.total_chars();
        package.meta = ContextMeta {
            total_chars,
            estimated_tokens: (total_chars as f64 * tokens_per_char) as usize,
            sections_included: SectionsIncluded {
                outline: !package.outline.is_empty(),
                prev_ending_hook: !package.prev_ending_hook.is_empty(),
                characters: !package.characters.is_empty(),
                world: !package.world.is_empty(),
                previous_ending: !package.previous_ending.is_empty(),
            },
        };
        package
    }

    /// Character count over every field's rendered value, the number included.
    fn total_chars(&self) -> usize {
        let texts = [
            self.episode.as_str(),
            self.ep_title.as_str(),
            self.outline.as_str(),
            self.prev_ending_hook.as_str(),
            self.characters.as_str(),
            self.world.as_str(),
            self.style_guide.as_str(),
            self.previous_ending.as_str(),
        ];
        let text_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
        text_chars + self.ep_number.to_string().len()
    }

    /// Render as pretty JSON with non-ASCII text kept as-is.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_counts_every_field() {
        let block = OutlineBlock {
            outline: "### EP-02: 시작".to_string(),
            title: "시작".to_string(),
            prev_ending_hook: String::new(),
        };
        let package = ContextPackage::new(
            EpisodeTag(2),
            block,
            "캐릭터".to_string(),
            String::new(),
            "스타일".to_string(),
            String::new(),
            1.5,
        );
        // "EP-02"(5) + "2"(1) + "시작"(2) + "### EP-02: 시작"(13) + "캐릭터"(3) + "스타일"(3)
        assert_eq!(package.meta.total_chars, 27);
        assert_eq!(package.meta.estimated_tokens, 40);
        assert!(package.meta.sections_included.outline);
        assert!(package.meta.sections_included.characters);
        assert!(!package.meta.sections_included.world);
        assert!(!package.meta.sections_included.prev_ending_hook);
    }

    #[test]
    fn json_uses_meta_key_and_keeps_hangul() {
        let package = ContextPackage::new(
            EpisodeTag(1),
            OutlineBlock::default(),
            String::new(),
            "### 서클 체계".to_string(),
            String::new(),
            String::new(),
            1.5,
        );
        let json = package.to_json().unwrap();
        assert!(json.contains("\"_meta\""));
        assert!(json.contains("서클 체계"));
        assert!(json.contains("\"episode\": \"EP-01\""));
    }
}
