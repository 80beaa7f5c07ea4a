// ATS scoring engine.
// Pure keyword matching over a resume snapshot; callers decide when to run it.

pub mod engine;
pub mod keywords;

pub use engine::score;
pub use keywords::{KeywordCorpus, KeywordSelection, DEFAULT_CORPUS};
