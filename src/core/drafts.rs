/// Draft discovery in the episodes directory.
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::sections::tail_chars;
use crate::schema::episode::EpisodeTag;

/// Subdirectory holding pilot drafts, searched after the main directory.
pub const PILOT_DIR: &str = "pilot";

/// Markdown files in `dir` whose name starts with `prefix`, sorted by name.
fn matching_drafts(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut matches: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                name.starts_with(prefix) && name.ends_with(".md")
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    matches.sort();
    matches
}

/// Locate the draft for `tag`: `EP-NN_*.md` first, then `EP-NN*.md`, in the
/// episodes directory and then in its pilot subdirectory.
pub fn find_draft(episodes_dir: &Path, tag: EpisodeTag) -> Option<PathBuf> {
    let tag_text = tag.to_string();
    let prefixes = [format!("{}_", tag_text), tag_text];
    let dirs = [episodes_dir.to_path_buf(), episodes_dir.join(PILOT_DIR)];

    for dir in &dirs {
        for prefix in &prefixes {
            if let Some(path) = matching_drafts(dir, prefix).into_iter().next() {
                debug!(episode = %tag, path = %path.display(), "draft found");
                return Some(path);
            }
        }
    }
    debug!(episode = %tag, dir = %episodes_dir.display(), "no draft found");
    None
}

/// The closing `tail_len` characters of the episode before `tag`.
///
/// Empty for the first episode or when no previous draft exists.
pub fn previous_ending(
    episodes_dir: &Path,
    tag: EpisodeTag,
    tail_len: usize,
) -> Result<String, std::io::Error> {
    let Some(prev) = tag.previous() else {
        return Ok(String::new());
    };
    match find_draft(episodes_dir, prev) {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(tail_chars(&text, tail_len).to_string())
        }
        None => Ok(String::new()),
    }
}
