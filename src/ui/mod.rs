//! CLI output: colored status lines, section headers and the analysis progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::analysis::{CitationReport, CitationTally, FetchFailure};
use crate::attribution::ClassificationPolicy;
use crate::models::Publication;
use crate::utils::truncate_with_ellipsis;

pub use crate::utils::{is_terminal, terminal_width};

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
}

pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
    }
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => println!("{} {}", icon.cyan().bold(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

pub fn print_divider() {
    println!("{}", "─".repeat(terminal_width().min(80)).dimmed());
}

/// Format a number with commas.
pub fn format_number(n: usize) -> String {
    n.to_string()
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect()
}

/// Percentage label colored by how much of the tally is self-citation.
pub fn colored_percentage(tally: &CitationTally) -> String {
    let label = tally.percentage_label();
    match tally.percentage() {
        None => label.dimmed().to_string(),
        Some(p) if p >= 30.0 => label.red().bold().to_string(),
        Some(p) if p >= 15.0 => label.yellow().to_string(),
        Some(_) => label.green().to_string(),
    }
}

/// Print the overall tally of a report.
pub fn print_overall(report: &CitationReport, policy: Option<ClassificationPolicy>) {
    print_section("Self-citation summary");
    if let Some(policy) = policy {
        println!("  {:<22} {}", "Policy:", policy.description());
    }
    println!(
        "  {:<22} {}",
        "Publications:",
        format_number(report.publications.len())
    );
    println!(
        "  {:<22} {}",
        "Citations analyzed:",
        format_number(report.overall.total).bold()
    );
    println!(
        "  {:<22} {}",
        "Self-citations:",
        format_number(report.overall.self_citations)
    );
    println!(
        "  {:<22} {}",
        "Self-citation rate:",
        colored_percentage(&report.overall)
    );
}

/// Print publications whose citing works could not be fetched.
pub fn print_failures(failures: &[FetchFailure]) {
    if failures.is_empty() {
        return;
    }
    print_section("Fetch failures");
    for failure in failures {
        print_status(
            Status::Warning,
            &format!(
                "{}: {}",
                truncate_with_ellipsis(&failure.title, 60),
                failure.error.dimmed()
            ),
        );
    }
}

/// Progress bar over the publications of one analysis run.
pub struct AnalysisProgress {
    pb: ProgressBar,
}

impl AnalysisProgress {
    /// Create a progress bar; hidden when `visible` is false.
    pub fn new(visible: bool) -> Self {
        let pb = if visible {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            pb.set_message("Fetching publication list");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        Self { pb }
    }

    /// Called before each publication is processed.
    pub fn publication(&self, index: usize, total: usize, publication: &Publication) {
        if index == 0 {
            self.pb.set_length(total as u64);
            self.pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {bar:30.cyan/blue} {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
            );
        }
        self.pb.set_position(index as u64);
        self.pb
            .set_message(truncate_with_ellipsis(&publication.title, 50));
    }

    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_position(self.pb.length().unwrap_or(0));
        self.pb.finish_and_clear();
        if !self.pb.is_hidden() {
            print_status(Status::Success, msg);
        }
    }

    pub fn finish_with_error(&self, msg: &str) {
        self.pb.abandon_with_message(format!("✗ {}", msg));
    }
}
