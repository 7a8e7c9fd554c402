use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^EP-?(\d+)").expect("episode tag pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EpisodeTagError {
    #[error("잘못된 에피소드 형식: {0} (예: EP-05)")]
    Invalid(String),
}

/// Canonical episode identifier, rendered as `EP-NN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeTag(pub u32);

impl EpisodeTag {
    /// Parse `EP-05`, `ep5` or `EP05`. Anything after the digits is ignored.
    pub fn parse(input: &str) -> Result<EpisodeTag, EpisodeTagError> {
        let number = TAG_PATTERN
            .captures(input.trim())
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .ok_or_else(|| EpisodeTagError::Invalid(input.to_string()))?;
        Ok(EpisodeTag(number))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// The episode before this one, if there is one. Episode 1 has none.
    pub fn previous(&self) -> Option<EpisodeTag> {
        if self.0 > 1 {
            Some(EpisodeTag(self.0 - 1))
        } else {
            None
        }
    }

    /// Outline block marker: `### EP-05:`.
    pub fn outline_marker(&self) -> String {
        format!("### {}:", self)
    }
}

impl std::fmt::Display for EpisodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EP-{:02}", self.0)
    }
}
