/// Context assembly pipeline: episode tag → context package.
///
/// Reads the lore documents, pulls the outline block and previous hook,
/// selects character and world sections from the outline text, and carries
/// over the previous episode's closing lines.
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::drafts::previous_ending;
use crate::core::lore::LoreRetriever;
use crate::core::outline::extract_outline;
use crate::schema::context::ContextPackage;
use crate::schema::episode::{EpisodeTag, EpisodeTagError};
use crate::schema::rules::{LoreRules, RulesError};

pub const OUTLINE_FILE: &str = "episode-outline.md";
pub const CHARACTERS_FILE: &str = "characters.md";
pub const WORLD_FILE: &str = "world.md";
pub const STYLE_GUIDE_FILE: &str = "style-guide.md";

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Episode(#[from] EpisodeTagError),
    #[error("로어 문서를 읽을 수 없음: {}: {}", .path.display(), .source)]
    MissingDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("이전 화 원고를 읽을 수 없음: {0}")]
    PreviousDraft(#[source] std::io::Error),
    #[error("rules error: {0}")]
    Rules(#[from] RulesError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the lore documents and episode drafts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub lore_dir: PathBuf,
    pub episodes_dir: PathBuf,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            lore_dir: PathBuf::from("lore"),
            episodes_dir: PathBuf::from("episodes"),
        }
    }
}

/// The four lore documents, read whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoreDocuments {
    pub outline: String,
    pub characters: String,
    pub world: String,
    pub style_guide: String,
}

impl LoreDocuments {
    /// Read every lore document from `lore_dir`. Any missing file is fatal.
    pub fn load(lore_dir: &Path) -> Result<LoreDocuments, AssemblyError> {
        Ok(LoreDocuments {
            outline: read_document(&lore_dir.join(OUTLINE_FILE))?,
            characters: read_document(&lore_dir.join(CHARACTERS_FILE))?,
            world: read_document(&lore_dir.join(WORLD_FILE))?,
            style_guide: read_document(&lore_dir.join(STYLE_GUIDE_FILE))?,
        })
    }
}

fn read_document(path: &Path) -> Result<String, AssemblyError> {
    std::fs::read_to_string(path).map_err(|source| AssemblyError::MissingDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds context packages from a rule table and a workspace layout.
pub struct ContextAssembler<'r> {
    rules: &'r LoreRules,
    layout: WorkspaceLayout,
}

impl<'r> ContextAssembler<'r> {
    pub fn new(rules: &'r LoreRules, layout: WorkspaceLayout) -> Self {
        Self { rules, layout }
    }

    /// Parse the episode argument and assemble its package from disk.
    pub fn assemble(&self, episode: &str) -> Result<ContextPackage, AssemblyError> {
        let tag = EpisodeTag::parse(episode)?;
        let documents = LoreDocuments::load(&self.layout.lore_dir)?;
        let previous = previous_ending(
            &self.layout.episodes_dir,
            tag,
            self.rules.limits.previous_tail_chars,
        )
        .map_err(AssemblyError::PreviousDraft)?;
        Ok(self.assemble_from(tag, &documents, previous))
    }

    /// Assemble a package from documents already in memory.
    pub fn assemble_from(
        &self,
        tag: EpisodeTag,
        documents: &LoreDocuments,
        previous_ending: String,
    ) -> ContextPackage {
        let block = extract_outline(&documents.outline, tag);
        let retriever = LoreRetriever::new(self.rules);
        let characters = retriever.extract_characters(&documents.characters, &block.outline);
        let world = retriever.extract_world(&documents.world, &block.outline);

        let package = ContextPackage::new(
            tag,
            block,
            characters,
            world,
            documents.style_guide.clone(),
            previous_ending,
            self.rules.limits.tokens_per_char,
        );
        info!(
            episode = %tag,
            total_chars = package.meta.total_chars,
            estimated_tokens = package.meta.estimated_tokens,
            "context assembled"
        );
        package
    }
}
