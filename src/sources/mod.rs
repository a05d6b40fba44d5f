//! Citation sources: where publications and their citing works come from.
//!
//! The analysis pipeline only needs two operations from a source, captured by
//! the [`CitationSource`] trait:
//!
//! - [`CitationSource::list_publications`]: every publication of the analyzed author
//! - [`CitationSource::list_citing_works`]: the works citing one publication
//!
//! Implementations:
//!
//! - [`GoogleScholarSource`]: scrapes a Google Scholar profile and its "Cited by" pages
//! - [`FixtureSource`]: reads a JSON fixture file, for offline runs
//! - [`MockSource`]: in-memory fixtures with injectable failures, for tests
//!
//! Sources hand back raw strings exactly as the upstream printed them; name
//! normalization happens in [`crate::attribution`].

mod fixture;
mod google_scholar;
pub mod mock;

pub use fixture::{FixtureFile, FixturePublication, FixtureSource};
pub use google_scholar::{parse_author_id, GoogleScholarSource};
pub use mock::MockSource;

use crate::models::{CitationHandle, RawCitingWork, RawPublication};
use async_trait::async_trait;

/// The CitationSource trait defines the interface the analyzer consumes.
///
/// # Implementing a New Source
///
/// 1. Create a struct that implements `CitationSource`
/// 2. Return publications with a [`CitationHandle`] when the source can list
///    their citing works
/// 3. Return an empty list (not an error) when a publication simply has no
///    citing works
#[async_trait]
pub trait CitationSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "google_scholar", "fixture")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// List the analyzed author's publications
    async fn list_publications(&self) -> Result<Vec<RawPublication>, SourceError>;

    /// List works citing the publication behind `handle`, at most `max_results`.
    ///
    /// May return fewer works than requested.
    async fn list_citing_works(
        &self,
        handle: &CitationHandle,
        max_results: usize,
    ) -> Result<Vec<RawCitingWork>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (JSON, HTML, etc.)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// The upstream answered with a CAPTCHA or bot-detection page
    #[error("Blocked by {0}: solve the CAPTCHA in a browser or retry later")]
    Blocked(String),

    /// Author or publication not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
