pub mod assembly;
pub mod drafts;
pub mod linter;
pub mod lore;
pub mod outline;
pub mod sections;
pub mod sentence;
