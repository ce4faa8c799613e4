pub mod analyzer;
pub mod checks;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod frontmatter;
pub mod paths;
pub mod platform;
pub mod types;

pub use analyzer::{analyze, analyze_corpus, AnalysisResult, AnalyzeOptions, Summary};
pub use error::{LintError, Result};
pub use types::{Category, Certainty, Finding};
