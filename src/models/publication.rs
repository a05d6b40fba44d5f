//! Publications and the works that cite them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attribution::get_normalized_authors;
use crate::models::AuthorList;

/// Opaque handle a source uses to look up the works citing a publication
/// (for Google Scholar this is the `cites=` cluster id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationHandle(String);

impl CitationHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CitationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A publication as yielded by a source, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPublication {
    pub title: String,

    /// Author string exactly as listed by the source
    pub authors: String,

    #[serde(default)]
    pub year: Option<i32>,

    /// Citation count reported by the source
    #[serde(default)]
    pub total_citations: u32,

    /// Absent when the source has no citation list for this publication
    #[serde(default)]
    pub citation_handle: Option<CitationHandle>,
}

/// A citing work as yielded by a source, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCitingWork {
    pub title: String,
    pub authors: String,
}

/// A publication of the analyzed author with its normalized author list.
///
/// Created once per discovered publication and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub authors_raw: String,
    pub authors: AuthorList,
    pub year: Option<i32>,
    pub total_citations: u32,
    pub citation_handle: Option<CitationHandle>,
}

impl Publication {
    /// Normalize a raw publication
    pub fn from_raw(raw: RawPublication) -> Self {
        let authors = get_normalized_authors(&raw.authors);
        Self {
            title: raw.title,
            authors_raw: raw.authors,
            authors,
            year: raw.year,
            total_citations: raw.total_citations,
            citation_handle: raw.citation_handle,
        }
    }

    /// Whether citing works should be requested for this publication
    pub fn has_citations(&self) -> bool {
        self.citation_handle.is_some() && self.total_citations > 0
    }
}

/// Builder for constructing Publication objects
#[derive(Debug, Clone)]
pub struct PublicationBuilder {
    raw: RawPublication,
}

impl PublicationBuilder {
    pub fn new(title: impl Into<String>, authors: impl Into<String>) -> Self {
        Self {
            raw: RawPublication {
                title: title.into(),
                authors: authors.into(),
                year: None,
                total_citations: 0,
                citation_handle: None,
            },
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.raw.year = Some(year);
        self
    }

    pub fn total_citations(mut self, count: u32) -> Self {
        self.raw.total_citations = count;
        self
    }

    pub fn citation_handle(mut self, handle: impl Into<String>) -> Self {
        self.raw.citation_handle = Some(CitationHandle::new(handle));
        self
    }

    /// Raw form, as a source would yield it
    pub fn build_raw(self) -> RawPublication {
        self.raw
    }

    /// Normalized publication
    pub fn build(self) -> Publication {
        Publication::from_raw(self.raw)
    }
}

/// A work citing one of the analyzed publications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitingWork {
    pub title: String,
    pub authors_raw: String,
    pub authors: AuthorList,
}

impl CitingWork {
    pub fn from_raw(raw: RawCitingWork) -> Self {
        let authors = get_normalized_authors(&raw.authors);
        Self {
            title: raw.title,
            authors_raw: raw.authors,
            authors,
        }
    }

    pub fn new(title: impl Into<String>, authors: impl Into<String>) -> Self {
        Self::from_raw(RawCitingWork {
            title: title.into(),
            authors: authors.into(),
        })
    }
}
