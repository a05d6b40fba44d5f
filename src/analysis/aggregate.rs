//! Self-citation tallies.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{CitationRecord, CitationRow, Publication};

/// Shown instead of a percentage when nothing was classified
pub const NO_CITATIONS: &str = "no citations to analyze";

/// Self vs. total citation counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CitationTally {
    pub self_citations: usize,
    pub total: usize,
}

impl CitationTally {
    pub fn add(&mut self, is_self_citation: bool) {
        self.total += 1;
        if is_self_citation {
            self.self_citations += 1;
        }
    }

    pub fn independent(&self) -> usize {
        self.total - self.self_citations
    }

    /// `100 * self / total`, or `None` when there is nothing to divide by
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(100.0 * self.self_citations as f64 / self.total as f64)
    }

    /// Percentage with one decimal, e.g. `66.7%`
    pub fn percentage_label(&self) -> String {
        self.percentage()
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| NO_CITATIONS.to_string())
    }
}

impl Serialize for CitationTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CitationTally", 4)?;
        state.serialize_field("self_citations", &self.self_citations)?;
        state.serialize_field("independent_citations", &self.independent())?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("self_citation_percentage", &self.percentage())?;
        state.end()
    }
}

/// Tally for one original publication (grouped by title)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationSummary {
    pub title: String,
    /// Author string of the first publication seen with this title
    pub authors_raw: String,
    pub year: Option<i32>,
    /// Citation count the source reported, when known
    pub reported_citations: Option<u32>,
    pub tally: CitationTally,
}

/// Overall and per-publication self-citation report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationReport {
    pub overall: CitationTally,
    pub publications: Vec<PublicationSummary>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CitationReport {
    /// Report from classified records only; publications without records do not appear
    pub fn from_records(records: &[CitationRecord]) -> Self {
        let mut report = Self::default();
        for record in records {
            let publication = &record.publication;
            let slot = report.seed(
                &publication.title,
                &publication.authors_raw,
                publication.year,
                Some(publication.total_citations),
            );
            report.tally(slot, record.is_self_citation);
        }
        report
    }

    /// Report recomputed from exported rows
    pub fn from_rows(rows: &[CitationRow]) -> Self {
        let mut report = Self::default();
        for row in rows {
            let slot = report.seed(
                &row.original_title,
                &row.original_authors_raw,
                row.original_year,
                None,
            );
            report.tally(slot, row.is_self_citation);
        }
        report
    }

    /// Report listing every publication, including those with no classified citations
    pub fn build(publications: &[Arc<Publication>], records: &[CitationRecord]) -> Self {
        let mut report = Self::default();
        for publication in publications {
            report.seed(
                &publication.title,
                &publication.authors_raw,
                publication.year,
                Some(publication.total_citations),
            );
        }

        for record in records {
            let publication = &record.publication;
            let slot = report.seed(
                &publication.title,
                &publication.authors_raw,
                publication.year,
                Some(publication.total_citations),
            );
            report.tally(slot, record.is_self_citation);
        }
        report
    }

    /// Find or create the summary for `title`; first-seen metadata wins
    fn seed(
        &mut self,
        title: &str,
        authors_raw: &str,
        year: Option<i32>,
        reported_citations: Option<u32>,
    ) -> usize {
        if let Some(&slot) = self.index.get(title) {
            return slot;
        }

        self.publications.push(PublicationSummary {
            title: title.to_string(),
            authors_raw: authors_raw.to_string(),
            year,
            reported_citations,
            tally: CitationTally::default(),
        });
        let slot = self.publications.len() - 1;
        self.index.insert(title.to_string(), slot);
        slot
    }

    fn tally(&mut self, slot: usize, is_self_citation: bool) {
        self.publications[slot].tally.add(is_self_citation);
        self.overall.add(is_self_citation);
    }

    /// Summary for a publication title
    pub fn publication(&self, title: &str) -> Option<&PublicationSummary> {
        self.index.get(title).map(|&slot| &self.publications[slot])
    }

    pub fn is_empty(&self) -> bool {
        self.overall.total == 0
    }
}
