//! JSON fixture source for offline analysis.
//!
//! # Fixture Format
//!
//! ```json
//! {
//!   "author": "Kim Lee",
//!   "publications": [
//!     {
//!       "title": "Graph Kernels for Molecules",
//!       "authors": "K Lee, S Patel",
//!       "year": 2019,
//!       "total_citations": 3,
//!       "citing_works": [
//!         { "title": "Kernel Methods Revisited", "authors": "K Lee" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! A publication without `citing_works` has no citation list; an empty array
//! means the list exists but is empty.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{CitationHandle, RawCitingWork, RawPublication};
use crate::sources::{CitationSource, SourceError};

/// Top-level fixture document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub publications: Vec<FixturePublication>,
}

/// One publication with its inline citing works
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePublication {
    pub title: String,

    #[serde(default)]
    pub authors: String,

    #[serde(default)]
    pub year: Option<i32>,

    /// Defaults to the number of inline citing works
    #[serde(default)]
    pub total_citations: Option<u32>,

    #[serde(default)]
    pub citing_works: Option<Vec<RawCitingWork>>,
}

/// Source backed by a fixture document; publication handles are list indices
#[derive(Debug, Clone)]
pub struct FixtureSource {
    fixture: FixtureFile,
}

impl FixtureSource {
    pub fn new(fixture: FixtureFile) -> Self {
        Self { fixture }
    }

    /// Parse a fixture from JSON text
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a fixture file
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded fixture from {}", path.display());
        Self::from_json(&content)
    }

    /// Author name recorded in the fixture, if any
    pub fn author(&self) -> Option<&str> {
        self.fixture.author.as_deref()
    }

    fn publication_at(&self, handle: &CitationHandle) -> Result<&FixturePublication, SourceError> {
        handle
            .as_str()
            .parse::<usize>()
            .ok()
            .and_then(|index| self.fixture.publications.get(index))
            .ok_or_else(|| SourceError::NotFound(format!("No fixture publication for handle {}", handle)))
    }
}

#[async_trait]
impl CitationSource for FixtureSource {
    fn id(&self) -> &str {
        "fixture"
    }

    fn name(&self) -> &str {
        "Fixture File"
    }

    async fn list_publications(&self) -> Result<Vec<RawPublication>, SourceError> {
        Ok(self
            .fixture
            .publications
            .iter()
            .enumerate()
            .map(|(index, publication)| {
                let inline_count = publication
                    .citing_works
                    .as_ref()
                    .map(|works| works.len() as u32)
                    .unwrap_or(0);

                RawPublication {
                    title: publication.title.clone(),
                    authors: publication.authors.clone(),
                    year: publication.year,
                    total_citations: publication.total_citations.unwrap_or(inline_count),
                    citation_handle: publication
                        .citing_works
                        .as_ref()
                        .map(|_| CitationHandle::new(index.to_string())),
                }
            })
            .collect())
    }

    async fn list_citing_works(
        &self,
        handle: &CitationHandle,
        max_results: usize,
    ) -> Result<Vec<RawCitingWork>, SourceError> {
        let publication = self.publication_at(handle)?;
        Ok(publication
            .citing_works
            .as_deref()
            .unwrap_or_default()
            .iter()
            .take(max_results)
            .cloned()
            .collect())
    }
}
