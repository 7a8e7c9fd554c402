//! Episode Workflow: context assembly and draft validation for serialized fiction.
//!
//! Assembles a bounded lore context package for one episode from the outline,
//! character, world and style documents, and lints finished drafts against the
//! structural and stylistic rules of the serialization format.

pub mod core;
pub mod schema;
