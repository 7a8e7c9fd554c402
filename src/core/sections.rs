/// Heading-bounded block extraction over markdown documents.

/// Stops for a `## ` level section: the next `## ` heading.
pub const H2_STOPS: &[&str] = &["\n## "];

/// Stops for a `### ` level section: the next `### ` or `## ` heading.
pub const H3_STOPS: &[&str] = &["\n### ", "\n## "];

/// A block of a document that starts at a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// The heading line prefix that was searched for.
    pub heading: &'a str,
    /// Everything after the heading up to the stop marker.
    pub body: &'a str,
}

impl<'a> Block<'a> {
    /// Heading and body as one contiguous string.
    pub fn full_text(&self) -> String {
        format!("{}{}", self.heading, self.body)
    }
}

/// Find the first block opened by `heading` at the start of a line.
///
/// The block runs until the earliest of `stops` or the end of the document.
/// A stop is only looked for after the first body character, so a block is
/// never empty. Returns `None` if the heading is missing or has no body.
pub fn find_block<'a>(text: &'a str, heading: &'a str, stops: &[&str]) -> Option<Block<'a>> {
    let start = text
        .match_indices(heading)
        .map(|(idx, _)| idx)
        .find(|&idx| idx == 0 || text[..idx].ends_with('\n'))?;

    let after = &text[start + heading.len()..];
    let first_len = after.chars().next()?.len_utf8();
    let end = stops
        .iter()
        .filter_map(|stop| after[first_len..].find(stop).map(|pos| pos + first_len))
        .min()
        .unwrap_or(after.len());

    Some(Block {
        heading,
        body: &after[..end],
    })
}

/// Keep at most `max_lines` lines, appending `marker` on its own line when
/// anything was dropped.
pub fn truncate_lines(section: &str, max_lines: usize, marker: &str) -> String {
    let lines: Vec<&str> = section.split('\n').collect();
    if lines.len() <= max_lines {
        return section.to_string();
    }
    let mut kept = lines[..max_lines].join("\n");
    kept.push('\n');
    kept.push_str(marker);
    kept
}

/// Last `count` characters of `text`, or all of it when shorter.
pub fn tail_chars(text: &str, count: usize) -> &str {
    let skip = text.chars().count().saturating_sub(count);
    match text.char_indices().nth(skip) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Extract a section and cap its length. `None` when the heading is absent.
pub fn extract_section(
    text: &str,
    heading: &str,
    stops: &[&str],
    max_lines: usize,
    marker: &str,
) -> Option<String> {
    find_block(text, heading, stops).map(|block| truncate_lines(&block.full_text(), max_lines, marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# 세계관\n\n## 마법\n\n### 서클 체계\n1서클부터 9서클.\n\n### 드래고니안\n용의 후예.\n## 지리\n### 지리 개요\n대륙 셋.";

    #[test]
    fn h3_block_stops_at_next_heading() {
        let block = find_block(DOC, "### 서클 체계", H3_STOPS).unwrap();
        assert_eq!(block.body, "\n1서클부터 9서클.\n");
        let block = find_block(DOC, "### 드래고니안", H3_STOPS).unwrap();
        assert_eq!(block.body, "\n용의 후예.");
    }

    #[test]
    fn h2_block_includes_nested_h3() {
        let block = find_block(DOC, "## 마법", H2_STOPS).unwrap();
        assert!(block.body.contains("### 서클 체계"));
        assert!(block.body.contains("### 드래고니안"));
        assert!(!block.body.contains("지리"));
    }

    #[test]
    fn last_block_runs_to_end() {
        let block = find_block(DOC, "### 지리 개요", H3_STOPS).unwrap();
        assert_eq!(block.full_text(), "### 지리 개요\n대륙 셋.");
    }

    #[test]
    fn heading_must_start_a_line() {
        // "## 지리" also occurs inside "### 지리 개요"; only the real H2 counts.
        let block = find_block(DOC, "## 지리", H2_STOPS).unwrap();
        assert!(block.body.starts_with('\n'));
        assert!(find_block(DOC, "## 없는 섹션", H2_STOPS).is_none());
    }

    #[test]
    fn truncate_appends_marker_only_when_needed() {
        let section = (1..=5).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        assert_eq!(truncate_lines(&section, 5, "[...]"), section);
        assert_eq!(truncate_lines(&section, 3, "[...]"), "1\n2\n3\n[...]");
    }

    #[test]
    fn tail_counts_characters_not_bytes() {
        assert_eq!(tail_chars("가나다라마", 2), "라마");
        assert_eq!(tail_chars("짧다", 30), "짧다");
        assert_eq!(tail_chars("", 5), "");
    }

    #[test]
    fn truncated_section_never_exceeds_cap_plus_marker() {
        let long = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let doc = format!("### 긴 섹션\n{long}");
        let section = extract_section(&doc, "### 긴 섹션", H3_STOPS, 60, "[... 이하 생략]").unwrap();
        let lines: Vec<&str> = section.split('\n').collect();
        assert_eq!(lines.len(), 61);
        assert_eq!(lines[60], "[... 이하 생략]");
    }
}
