//! Classified citations and their flat export form.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{CitingWork, Publication};

/// One (publication, citing work) pair with its verdict
#[derive(Debug, Clone)]
pub struct CitationRecord {
    pub publication: Arc<Publication>,
    pub citing: CitingWork,
    pub is_self_citation: bool,
}

impl CitationRecord {
    /// Flatten into an export row
    pub fn to_row(&self) -> CitationRow {
        CitationRow {
            original_title: self.publication.title.clone(),
            original_authors_raw: self.publication.authors_raw.clone(),
            original_year: self.publication.year,
            citing_title: self.citing.title.clone(),
            citing_authors_raw: self.citing.authors_raw.clone(),
            is_self_citation: self.is_self_citation,
            original_normalized_authors: self.publication.authors.joined(),
            citing_normalized_authors: self.citing.authors.joined(),
        }
    }
}

/// Flat table row written to and read from CSV exports.
///
/// Every summary report can be recomputed from a set of these rows alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationRow {
    pub original_title: String,
    pub original_authors_raw: String,
    pub original_year: Option<i32>,
    pub citing_title: String,
    pub citing_authors_raw: String,
    pub is_self_citation: bool,
    pub original_normalized_authors: String,
    pub citing_normalized_authors: String,
}
