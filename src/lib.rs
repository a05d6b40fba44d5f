//! # Scholar Self-Citation
//!
//! Measures how much of an author's citation count comes from their own
//! later work.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`attribution`]: Author-name normalization and self-citation classification
//! - [`models`]: Publications, citing works and classified citation records
//! - [`sources`]: Citation sources (Google Scholar, JSON fixtures, mock) behind one trait
//! - [`analysis`]: The per-publication analysis loop and report aggregation
//! - [`utils`]: HTTP client, retry, CSV/JSON export and terminal formatting
//! - [`config`]: Configuration management
//! - [`ui`]: Colored terminal output and progress bars for the CLI

pub mod analysis;
pub mod attribution;
pub mod config;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use analysis::{AnalysisOptions, AnalysisOutcome, CitationAnalyzer, CitationReport};
pub use attribution::{classify, get_normalized_authors, normalize_author, ClassificationPolicy};
pub use models::{AuthorList, CitationRecord, CitationRow, NormalizedAuthor, Publication};
pub use sources::{CitationSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
