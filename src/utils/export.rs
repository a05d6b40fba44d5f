//! CSV and JSON export of classified citations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

use crate::analysis::{CitationReport, FetchFailure};
use crate::attribution::ClassificationPolicy;
use crate::models::CitationRow;

/// Errors that can occur while writing or reading exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// One line of the per-publication summary CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    pub reported_citations: Option<u32>,
    pub citations_analyzed: usize,
    pub self_citations: usize,
    pub self_citation_percentage: Option<f64>,
}

impl SummaryRow {
    pub fn from_report(report: &CitationReport) -> Vec<Self> {
        report
            .publications
            .iter()
            .map(|summary| SummaryRow {
                title: summary.title.clone(),
                authors: summary.authors_raw.clone(),
                year: summary.year,
                reported_citations: summary.reported_citations,
                citations_analyzed: summary.tally.total,
                self_citations: summary.tally.self_citations,
                self_citation_percentage: summary
                    .tally
                    .percentage()
                    .map(|p| (p * 10.0).round() / 10.0),
            })
            .collect()
    }
}

/// JSON document written by [`write_report_json`]
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    /// Unknown when the report was recomputed from a CSV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<ClassificationPolicy>,
    pub report: &'a CitationReport,
    pub failures: &'a [FetchFailure],
}

impl<'a> ReportDocument<'a> {
    pub fn new(
        policy: Option<ClassificationPolicy>,
        report: &'a CitationReport,
        failures: &'a [FetchFailure],
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            policy,
            report,
            failures,
        }
    }
}

fn create(path: &Path) -> Result<File, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
    }
    File::create(path).map_err(|e| ExportError::io(path, e))
}

/// Serialize rows as CSV with a header line.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Parse citation rows from CSV with a header line.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CitationRow>, ExportError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<CitationRow>, csv::Error>>()?;
    Ok(rows)
}

/// Write one CSV row per classified citation.
pub fn write_records_csv(path: &Path, rows: &[CitationRow]) -> Result<(), ExportError> {
    write_rows(create(path)?, rows)?;
    tracing::info!("Wrote {} citation rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a CSV previously written by [`write_records_csv`].
pub fn read_records_csv(path: &Path) -> Result<Vec<CitationRow>, ExportError> {
    let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
    read_rows(file)
}

/// Write one CSV row per publication of the report.
pub fn write_summary_csv(path: &Path, report: &CitationReport) -> Result<(), ExportError> {
    let rows = SummaryRow::from_report(report);
    write_rows(create(path)?, &rows)?;
    tracing::info!("Wrote {} publication summaries to {}", rows.len(), path.display());
    Ok(())
}

/// Write the full report as pretty-printed JSON.
pub fn write_report_json(path: &Path, document: &ReportDocument<'_>) -> Result<(), ExportError> {
    let mut file = create(path)?;
    serde_json::to_writer_pretty(&mut file, document)?;
    file.write_all(b"\n").map_err(|e| ExportError::io(path, e))?;
    tracing::info!("Wrote JSON report to {}", path.display());
    Ok(())
}
