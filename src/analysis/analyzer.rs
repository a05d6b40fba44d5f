//! Per-publication fetch, normalize and classify loop.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::CitationReport;
use crate::attribution::{CitationClassifier, ClassificationPolicy};
use crate::config::Config;
use crate::models::{CitationRecord, CitationRow, CitingWork, Publication};
use crate::sources::{CitationSource, SourceError};

/// Limits and policy for one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub policy: ClassificationPolicy,
    /// Analyze only the first N publications of the listing
    pub max_publications: Option<usize>,
    /// Citing works requested per publication
    pub max_citing_works: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AnalysisOptions {
    fn from(config: &Config) -> Self {
        Self {
            policy: config.analysis.policy,
            max_publications: config.analysis.max_publications,
            max_citing_works: config.scholar.max_citing_works,
        }
    }
}

/// A publication whose citing works could not be fetched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub title: String,
    pub error: String,
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub policy: ClassificationPolicy,
    pub publications: Vec<Arc<Publication>>,
    pub records: Vec<CitationRecord>,
    pub failures: Vec<FetchFailure>,
}

impl AnalysisOutcome {
    pub fn report(&self) -> CitationReport {
        CitationReport::build(&self.publications, &self.records)
    }

    pub fn rows(&self) -> Vec<CitationRow> {
        self.records.iter().map(CitationRecord::to_row).collect()
    }
}

/// Walks an author's publications one at a time and classifies every citing work.
#[derive(Debug)]
pub struct CitationAnalyzer {
    source: Arc<dyn CitationSource>,
    classifier: CitationClassifier,
    options: AnalysisOptions,
}

impl CitationAnalyzer {
    pub fn new(source: Arc<dyn CitationSource>, options: AnalysisOptions) -> Self {
        Self {
            source,
            classifier: CitationClassifier::new(options.policy),
            options,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Run the analysis without progress reporting
    pub async fn run(&self) -> Result<AnalysisOutcome, SourceError> {
        self.run_with_progress(|_, _, _| {}).await
    }

    /// Run the analysis, calling `on_progress(index, total, publication)` before
    /// each publication is processed.
    ///
    /// A failure to list publications aborts the run. A failure to fetch the
    /// citing works of one publication is logged, recorded in
    /// [`AnalysisOutcome::failures`] and contributes zero citations.
    pub async fn run_with_progress<F>(&self, mut on_progress: F) -> Result<AnalysisOutcome, SourceError>
    where
        F: FnMut(usize, usize, &Publication),
    {
        let raw = self.source.list_publications().await?;
        let limit = self.options.max_publications.unwrap_or(usize::MAX);

        let publications: Vec<Arc<Publication>> = raw
            .into_iter()
            .take(limit)
            .map(|raw| Arc::new(Publication::from_raw(raw)))
            .collect();

        info!(
            "Analyzing {} publications from {} ({} policy)",
            publications.len(),
            self.source.name(),
            self.options.policy
        );

        let total = publications.len();
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (index, publication) in publications.iter().enumerate() {
            on_progress(index, total, publication);

            match self.analyze_publication(publication).await {
                Ok(mut classified) => {
                    debug!(
                        "{}: {} citing works classified",
                        publication.title,
                        classified.len()
                    );
                    records.append(&mut classified);
                }
                Err(e) => {
                    warn!("Skipping citations of '{}': {}", publication.title, e);
                    failures.push(FetchFailure {
                        title: publication.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Classified {} citing works ({} fetch failures)",
            records.len(),
            failures.len()
        );

        Ok(AnalysisOutcome {
            policy: self.options.policy,
            publications,
            records,
            failures,
        })
    }

    async fn analyze_publication(
        &self,
        publication: &Arc<Publication>,
    ) -> Result<Vec<CitationRecord>, SourceError> {
        let handle = match &publication.citation_handle {
            Some(handle) if publication.total_citations > 0 => handle,
            _ => return Ok(Vec::new()),
        };

        let citing = self
            .source
            .list_citing_works(handle, self.options.max_citing_works)
            .await?;

        Ok(citing
            .into_iter()
            .map(|raw| self.classifier.record(publication, CitingWork::from_raw(raw)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublicationBuilder;
    use crate::sources::mock::make_citing_work;
    use crate::sources::MockSource;

    fn analyzer(source: MockSource, policy: ClassificationPolicy) -> (Arc<MockSource>, CitationAnalyzer) {
        let source = Arc::new(source);
        let options = AnalysisOptions {
            policy,
            max_publications: None,
            max_citing_works: 100,
        };
        let analyzer = CitationAnalyzer::new(source.clone() as Arc<dyn CitationSource>, options);
        (source, analyzer)
    }

    #[tokio::test]
    async fn test_two_of_three_self_citations() {
        let source = MockSource::new();
        source.add_publication(
            PublicationBuilder::new("Graph Kernels", "K Lee, S Patel")
                .total_citations(3)
                .citation_handle("p1")
                .build_raw(),
        );
        source.set_citing_works(
            "p1",
            vec![
                make_citing_work("A", "K Lee, T Nguyen"),
                make_citing_work("B", "R Gomez"),
                make_citing_work("C", "S Patel"),
            ],
        );

        let (_, analyzer) = analyzer(source, ClassificationPolicy::AnyAuthorOverlap);
        let outcome = analyzer.run().await.unwrap();

        let flags: Vec<bool> = outcome.records.iter().map(|r| r.is_self_citation).collect();
        assert_eq!(flags, vec![true, false, true]);

        let report = outcome.report();
        assert_eq!(report.overall.self_citations, 2);
        assert_eq!(report.overall.total, 3);
        assert_eq!(report.overall.percentage_label(), "66.7%");
    }

    #[tokio::test]
    async fn test_last_author_policy() {
        let source = MockSource::new();
        source.add_publication(
            PublicationBuilder::new("Graph Kernels", "K Lee, S Patel")
                .total_citations(2)
                .citation_handle("p1")
                .build_raw(),
        );
        source.set_citing_works(
            "p1",
            vec![
                make_citing_work("A", "K Lee, T Nguyen"),
                make_citing_work("B", "S Patel"),
            ],
        );

        let (_, analyzer) = analyzer(source, ClassificationPolicy::LastAuthorOnly);
        let outcome = analyzer.run().await.unwrap();

        let flags: Vec<bool> = outcome.records.iter().map(|r| r.is_self_citation).collect();
        assert_eq!(flags, vec![false, true]);
        assert_eq!(outcome.policy, ClassificationPolicy::LastAuthorOnly);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_isolated() {
        let source = MockSource::new();
        source.add_publication(
            PublicationBuilder::new("Broken", "K Lee")
                .total_citations(4)
                .citation_handle("bad")
                .build_raw(),
        );
        source.add_publication(
            PublicationBuilder::new("Working", "K Lee")
                .total_citations(1)
                .citation_handle("good")
                .build_raw(),
        );
        source.fail_handle("bad");
        source.set_citing_works("good", vec![make_citing_work("A", "K Lee")]);

        let (_, analyzer) = analyzer(source, ClassificationPolicy::AnyAuthorOverlap);
        let outcome = analyzer.run().await.unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].title, "Broken");

        let report = outcome.report();
        assert_eq!(report.publication("Broken").unwrap().tally.total, 0);
        assert_eq!(report.publication("Working").unwrap().tally.self_citations, 1);
    }

    #[tokio::test]
    async fn test_publication_listing_failure_is_fatal() {
        let source = MockSource::new();
        source.fail_publications();

        let (_, analyzer) = analyzer(source, ClassificationPolicy::AnyAuthorOverlap);
        assert!(analyzer.run().await.is_err());
    }

    #[tokio::test]
    async fn test_skips_publications_without_handle_or_citations() {
        let source = MockSource::new();
        source.add_publication(PublicationBuilder::new("No handle", "K Lee").total_citations(5).build_raw());
        source.add_publication(
            PublicationBuilder::new("Zero count", "K Lee")
                .total_citations(0)
                .citation_handle("zero")
                .build_raw(),
        );
        source.add_publication(
            PublicationBuilder::new("Cited", "K Lee")
                .total_citations(1)
                .citation_handle("cited")
                .build_raw(),
        );

        let (source, analyzer) = analyzer(source, ClassificationPolicy::AnyAuthorOverlap);
        let outcome = analyzer.run().await.unwrap();

        assert_eq!(outcome.publications.len(), 3);
        let requested: Vec<String> = source
            .requested_handles()
            .iter()
            .map(|h| h.as_str().to_string())
            .collect();
        assert_eq!(requested, vec!["cited"]);
    }

    #[tokio::test]
    async fn test_limits_and_progress() {
        let source = MockSource::new();
        for i in 0..4 {
            source.add_publication(PublicationBuilder::new(format!("Paper {}", i), "K Lee").build_raw());
        }

        let source = Arc::new(source);
        let analyzer = CitationAnalyzer::new(
            source,
            AnalysisOptions {
                policy: ClassificationPolicy::AnyAuthorOverlap,
                max_publications: Some(2),
                max_citing_works: 10,
            },
        );

        let mut seen = Vec::new();
        let outcome = analyzer
            .run_with_progress(|index, total, publication| {
                seen.push((index, total, publication.title.clone()));
            })
            .await
            .unwrap();

        assert_eq!(outcome.publications.len(), 2);
        assert_eq!(
            seen,
            vec![(0, 2, "Paper 0".to_string()), (1, 2, "Paper 1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_max_citing_works_is_forwarded() {
        let source = MockSource::new();
        source.add_publication(
            PublicationBuilder::new("Popular", "K Lee")
                .total_citations(50)
                .citation_handle("p")
                .build_raw(),
        );
        source.set_citing_works(
            "p",
            (0..5).map(|i| make_citing_work(&format!("W{}", i), "R Gomez")).collect(),
        );

        let source = Arc::new(source);
        let analyzer = CitationAnalyzer::new(
            source,
            AnalysisOptions {
                max_citing_works: 3,
                ..AnalysisOptions::default()
            },
        );

        let outcome = analyzer.run().await.unwrap();
        assert_eq!(outcome.records.len(), 3);
    }
}
