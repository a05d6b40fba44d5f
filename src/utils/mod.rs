//! Utility modules shared by the sources, the analyzer and the CLI.
//!
//! - [`HttpClient`]: shared reqwest client with a browser-like user agent and cookies
//! - [`RetryConfig`] / [`with_retry`]: exponential backoff on transient fetch errors
//! - [`write_records_csv`] / [`read_records_csv`]: flat CSV of classified citations
//! - [`write_summary_csv`] / [`write_report_json`]: per-publication report exports
//! - [`truncate_with_ellipsis`] and friends: unicode-aware terminal formatting
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use scholar_selfcite::sources::SourceError;
//! use scholar_selfcite::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_page() -> Result<String, SourceError> { Ok("page".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let page = with_retry(config, || fetch_page()).await?;
//! # Ok(())
//! # }
//! ```

mod display;
mod export;
mod http;
mod retry;

pub use display::{
    display_width, format_year, is_terminal, report_table_columns, terminal_width,
    truncate_at_word, truncate_with_ellipsis, ColumnConfig,
};
pub use export::{
    read_records_csv, read_rows, write_records_csv, write_report_json, write_rows,
    write_summary_csv, ExportError, ReportDocument, SummaryRow,
};
pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use retry::{scholar_retry_config, with_retry, RetryConfig, TransientError};
