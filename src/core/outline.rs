/// Outline and ending-hook extraction from the episode outline document.
use tracing::{debug, warn};

use crate::core::sections::find_block;
use crate::schema::context::OutlineBlock;
use crate::schema::episode::EpisodeTag;

/// An outline block ends at the next episode marker or a horizontal rule.
const OUTLINE_STOPS: &[&str] = &["\n### EP-", "\n---"];

/// Bold label of the closing-hook field inside an outline block.
pub const ENDING_HOOK_LABEL: &str = "**엔딩 훅**:";

/// A hook runs until a blank line, the next list item, or the next bold label.
const HOOK_STOPS: &[&str] = &["\n\n", "\n-", "\n**"];

/// Extract the outline block for `tag` and the previous episode's ending hook.
///
/// Missing blocks or labels leave the corresponding fields empty.
pub fn extract_outline(text: &str, tag: EpisodeTag) -> OutlineBlock {
    let mut result = OutlineBlock::default();

    let marker = tag.outline_marker();
    match find_block(text, &marker, OUTLINE_STOPS) {
        Some(block) => {
            result.outline = block.full_text().trim().to_string();
            result.title = title_of(block.body);
            debug!(episode = %tag, title = %result.title, "outline block found");
        }
        None => warn!(episode = %tag, "no outline block"),
    }

    if let Some(prev) = tag.previous() {
        let prev_marker = prev.outline_marker();
        if let Some(block) = find_block(text, &prev_marker, OUTLINE_STOPS) {
            result.prev_ending_hook = ending_hook(block.body).unwrap_or_default();
        }
        if result.prev_ending_hook.is_empty() {
            debug!(episode = %prev, "no ending hook for previous episode");
        }
    }

    result
}

/// Title: the rest of the marker line, cut before any `[` annotation.
fn title_of(body: &str) -> String {
    let first_line = body.split('\n').next().unwrap_or_default();
    let title = match first_line.find('[') {
        Some(pos) => &first_line[..pos],
        None => first_line,
    };
    title.trim().to_string()
}

/// Text after the ending-hook label, up to the end of the field.
///
/// Only spaces and tabs are skipped before the stops are searched, so a
/// label with no value never borrows the following line.
pub fn ending_hook(block: &str) -> Option<String> {
    let start = block.find(ENDING_HOOK_LABEL)? + ENDING_HOOK_LABEL.len();
    let rest = block[start..].trim_start_matches([' ', '\t']);
    let end = HOOK_STOPS
        .iter()
        .filter_map(|stop| rest.find(stop))
        .min()
        .unwrap_or(rest.len());
    let hook = rest[..end].trim();
    if hook.is_empty() {
        None
    } else {
        Some(hook.to_string())
    }
}
