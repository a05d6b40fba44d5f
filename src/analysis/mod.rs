//! Sequential citation analysis and report aggregation.
//!
//! - [`CitationAnalyzer`]: fetch, normalize and classify one publication at a time
//! - [`CitationReport`]: overall and per-publication self-citation tallies,
//!   derivable from the flat list of records alone

mod aggregate;
mod analyzer;

pub use aggregate::{CitationReport, CitationTally, PublicationSummary, NO_CITATIONS};
pub use analyzer::{AnalysisOptions, AnalysisOutcome, CitationAnalyzer, FetchFailure};
