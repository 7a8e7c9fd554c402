/// Lore retrieval: keyword-driven selection of character and world sections.
///
/// Matching is literal, case-sensitive substring containment against the
/// outline text. A keyword inside an unrelated word still triggers its
/// category; extra sections are acceptable, missing ones are not.
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::core::sections::{extract_section, H2_STOPS, H3_STOPS};
use crate::schema::rules::LoreRules;

/// Selects and extracts lore sections relevant to an outline.
pub struct LoreRetriever<'r> {
    rules: &'r LoreRules,
}

impl<'r> LoreRetriever<'r> {
    pub fn new(rules: &'r LoreRules) -> Self {
        Self { rules }
    }

    /// Character headers whose display name occurs in the outline, in table
    /// order. Falls back to the default character when none match.
    pub fn select_characters(&self, outline: &str) -> Vec<&'r str> {
        let mut headers: Vec<&'r str> = Vec::new();
        for rule in &self.rules.characters {
            if outline.contains(rule.name.as_str()) && !headers.contains(&rule.header.as_str()) {
                debug!(name = %rule.name, header = %rule.header, "character mentioned");
                headers.push(rule.header.as_str());
            }
        }
        if headers.is_empty() {
            debug!(header = %self.rules.default_character, "no character mentioned, using default");
            headers.push(self.rules.default_character.as_str());
        }
        headers
    }

    /// World section names to include, deduplicated in first-seen order.
    ///
    /// Always-on categories come first. Every other category contributes all
    /// of its sections once any one of its keywords appears in the outline.
    pub fn select_world_sections(&self, outline: &str) -> Vec<&'r str> {
        let mut seen: FxHashSet<&'r str> = FxHashSet::default();
        let mut sections: Vec<&'r str> = Vec::new();
        let mut include = |names: &'r [String]| {
            for name in names {
                if seen.insert(name.as_str()) {
                    sections.push(name.as_str());
                }
            }
        };

        for rule in self.rules.world.iter().filter(|r| r.always_applies()) {
            debug!(category = %rule.category, "category always included");
            include(rule.sections.as_slice());
        }
        for rule in self.rules.world.iter().filter(|r| !r.always_applies()) {
            if let Some(keyword) = rule.first_hit(outline) {
                debug!(category = %rule.category, keyword, "category activated");
                include(rule.sections.as_slice());
            }
        }

        sections
    }

    /// Extract selected character sections (`## {header}`), joined by a blank line.
    pub fn extract_characters(&self, characters_doc: &str, outline: &str) -> String {
        let limits = &self.rules.limits;
        let extracted: Vec<String> = self
            .select_characters(outline)
            .into_iter()
            .filter_map(|header| {
                let heading = format!("## {}", header);
                let section = extract_section(
                    characters_doc,
                    &heading,
                    H2_STOPS,
                    limits.character_lines,
                    &limits.elision_marker,
                );
                if section.is_none() {
                    debug!(header, "character section missing");
                }
                section
            })
            .collect();
        extracted.join("\n\n")
    }

    /// Extract selected world sections (`### {name}`), joined by a blank line.
    pub fn extract_world(&self, world_doc: &str, outline: &str) -> String {
        let limits = &self.rules.limits;
        let extracted: Vec<String> = self
            .select_world_sections(outline)
            .into_iter()
            .filter_map(|name| {
                let heading = format!("### {}", name);
                let section = extract_section(
                    world_doc,
                    &heading,
                    H3_STOPS,
                    limits.world_lines,
                    &limits.elision_marker,
                );
                if section.is_none() {
                    debug!(section = name, "world section missing");
                }
                section
            })
            .collect();
        extracted.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> LoreRules {
        LoreRules::bundled().unwrap()
    }

    #[test]
    fn meaningless_outline_still_gets_circle_system() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        assert_eq!(retriever.select_world_sections("의미 없는 텍스트"), vec!["서클 체계"]);
    }

    #[test]
    fn one_keyword_activates_whole_category() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        let sections = retriever.select_world_sections("드래곤이 나타났다");
        assert_eq!(sections, vec!["서클 체계", "드래고니안", "드래곤 사회 규칙"]);
    }

    #[test]
    fn keyword_inside_other_word_still_matches() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        // "검" sits inside "검은", which is not about swords.
        let sections = retriever.select_world_sections("검은 하늘");
        assert!(sections.contains(&"실전 마법 운용"));
    }

    #[test]
    fn shared_keyword_sections_are_deduplicated() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        // "카르마" triggers politics, "코오리" triggers dragon; "서클" also
        // names the energy category.
        let sections = retriever.select_world_sections("카르마와 코오리가 서클을 논했다");
        let unique: FxHashSet<_> = sections.iter().collect();
        assert_eq!(unique.len(), sections.len());
        assert!(sections.contains(&"왕립 초능력원"));
        assert!(sections.contains(&"드래고니안"));
        assert!(sections.contains(&"에너지원 체계"));
    }

    #[test]
    fn character_selection_and_default() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        assert_eq!(
            retriever.select_characters("소피아와 루시안의 대화"),
            vec!["소피아", "루시안 아우렐리스"]
        );
        assert_eq!(
            retriever.select_characters("아무도 없다"),
            vec!["사일라즈 엔타리스"]
        );
    }

    #[test]
    fn extraction_skips_missing_sections() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        let doc = "## 소피아\n치유사.\n\n## 마일스 엔타리스\n형.";
        let text = retriever.extract_characters(doc, "소피아와 알드릭");
        assert_eq!(text, "## 소피아\n치유사.\n");
    }

    #[test]
    fn character_sections_are_capped() {
        let rules = rules();
        let retriever = LoreRetriever::new(&rules);
        let body = (0..120).map(|i| format!("설정 {i}")).collect::<Vec<_>>().join("\n");
        let doc = format!("## 사일라즈 엔타리스\n{body}");
        let text = retriever.extract_characters(&doc, "");
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 81);
        assert_eq!(lines[80], "[... 이하 생략]");
    }
}
