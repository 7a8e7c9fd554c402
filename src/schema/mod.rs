/// Data types shared by the context and validation pipelines.
pub mod context;
pub mod episode;
pub mod report;
pub mod rules;
