use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use scholar_selfcite::analysis::{
    AnalysisOptions, AnalysisOutcome, CitationAnalyzer, CitationReport, FetchFailure,
};
use scholar_selfcite::attribution::{classify, get_normalized_authors, segment_authors, ClassificationPolicy};
use scholar_selfcite::config::{find_config_file, load_config, load_env_config, Config};
use scholar_selfcite::sources::{CitationSource, FixtureSource, GoogleScholarSource};
use scholar_selfcite::ui::{self, AnalysisProgress, Status};
use scholar_selfcite::utils::{
    format_year, read_records_csv, report_table_columns, truncate_at_word, truncate_with_ellipsis,
    write_records_csv, write_report_json, write_summary_csv, ReportDocument,
};
use serde_json::json;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scholar Self-Citation - measure how much of an author's citation count is self-citation
#[derive(Parser, Debug)]
#[command(name = "scholar-selfcite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Measure self-citation ratios for an author's publications", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

/// Self-citation policy
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PolicyArg {
    /// Any shared author makes a self-citation
    #[value(name = "any")]
    Any,
    /// Only the original's last author counts
    #[value(name = "last")]
    Last,
}

impl From<PolicyArg> for ClassificationPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Any => ClassificationPolicy::AnyAuthorOverlap,
            PolicyArg::Last => ClassificationPolicy::LastAuthorOnly,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze every publication of an author profile
    #[command(alias = "a")]
    Analyze {
        /// Google Scholar profile URL or author id
        #[arg(required_unless_present = "fixture")]
        profile: Option<String>,

        /// Read publications and citing works from a JSON fixture instead of Google Scholar
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Self-citation policy (default from config: any)
        #[arg(long, short, value_enum)]
        policy: Option<PolicyArg>,

        /// Analyze only the first N publications
        #[arg(long)]
        max_publications: Option<usize>,

        /// Citing works fetched per publication
        #[arg(long)]
        max_citing: Option<usize>,

        /// Delay between Scholar page requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Write one CSV row per classified citation
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write per-publication summaries as CSV
        #[arg(long)]
        summary_csv: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Recompute the report from an exported citation CSV
    #[command(alias = "r")]
    Report {
        /// CSV written by `analyze --csv`
        csv: PathBuf,
    },

    /// Show how an author string is segmented and normalized
    #[command(alias = "n")]
    Normalize {
        /// Raw author string, e.g. "Smith, J., and Doe, A."
        authors: String,
    },

    /// Classify a single pair of author strings
    #[command(alias = "c")]
    Check {
        /// Authors of the cited publication
        #[arg(long)]
        original: String,

        /// Authors of the citing work
        #[arg(long)]
        citing: String,

        /// Self-citation policy
        #[arg(long, short, value_enum, default_value_t = PolicyArg::Any)]
        policy: PolicyArg,
    },
}

fn load_configuration(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => match find_config_file() {
            Some(path) => load_config(&path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => load_env_config().context("Failed to read SELFCITE_* environment")?,
        },
    };
    Ok(config)
}

fn init_logging(cli: &Cli, config: &Config) {
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("scholar_selfcite={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    init_logging(&cli, &config);
    tracing::debug!("Effective configuration: {:?}", config);

    let format = cli.output.resolve();

    match cli.command {
        Commands::Analyze {
            profile,
            fixture,
            policy,
            max_publications,
            max_citing,
            delay_ms,
            csv,
            summary_csv,
            json,
        } => {
            let mut config = config;
            if let Some(policy) = policy {
                config.analysis.policy = policy.into();
            }
            if max_publications.is_some() {
                config.analysis.max_publications = max_publications;
            }
            if let Some(max_citing) = max_citing {
                config.scholar.max_citing_works = max_citing;
            }
            if let Some(delay_ms) = delay_ms {
                config.scholar.request_delay_ms = delay_ms;
            }

            let source: Arc<dyn CitationSource> = match (&fixture, &profile) {
                (Some(path), _) => Arc::new(
                    FixtureSource::load(path)
                        .with_context(|| format!("Failed to load fixture {}", path.display()))?,
                ),
                (None, Some(profile)) => Arc::new(GoogleScholarSource::new(profile, &config.scholar)?),
                (None, None) => anyhow::bail!("A profile URL/id or --fixture is required"),
            };

            let show_progress =
                format == OutputFormat::Table && !cli.quiet && std::io::stderr().is_terminal();
            let progress = AnalysisProgress::new(show_progress);

            let analyzer = CitationAnalyzer::new(source, AnalysisOptions::from(&config));
            let outcome = match analyzer
                .run_with_progress(|index, total, publication| {
                    progress.publication(index, total, publication)
                })
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    progress.finish_with_error("Could not list publications");
                    return Err(e).context("Failed to list publications");
                }
            };
            progress.finish_with_success(&format!(
                "Classified {} citing works across {} publications",
                outcome.records.len(),
                outcome.publications.len()
            ));

            let report = outcome.report();
            export_outcome(&config, &outcome, &report, csv, summary_csv, json)?;
            output_report(
                &report,
                Some(outcome.policy),
                &outcome.failures,
                format,
                cli.quiet,
            );
        }

        Commands::Report { csv } => {
            let path = config.export.resolve(&csv);
            let rows = read_records_csv(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            tracing::info!("Loaded {} citation rows from {}", rows.len(), path.display());

            let report = CitationReport::from_rows(&rows);
            output_report(&report, None, &[], format, cli.quiet);
        }

        Commands::Normalize { authors } => {
            let segments = segment_authors(&authors);
            let normalized = get_normalized_authors(&authors);

            match format {
                OutputFormat::Json => {
                    let value = json!({
                        "input": authors,
                        "segments": segments,
                        "normalized": normalized,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Plain => {
                    for token in normalized.tokens() {
                        println!("{}", token);
                    }
                }
                _ if segments.is_empty() => {
                    ui::print_status(Status::Info, "No author names to normalize");
                }
                _ => {
                    let mut table = Table::new();
                    table.load_preset(comfy_table::presets::UTF8_FULL);
                    table.set_header(vec!["#", "Segment", "Normalized"]);
                    for (i, segment) in segments.iter().enumerate() {
                        let token = scholar_selfcite::normalize_author(segment)
                            .map(|author| author.to_string())
                            .unwrap_or_else(|| "(dropped)".to_string());
                        table.add_row(vec![
                            Cell::new(i + 1),
                            Cell::new(segment),
                            Cell::new(token).add_attribute(Attribute::Bold),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }

        Commands::Check {
            original,
            citing,
            policy,
        } => {
            let policy: ClassificationPolicy = policy.into();
            let original_authors = get_normalized_authors(&original);
            let citing_authors = get_normalized_authors(&citing);
            let is_self_citation = classify(&original_authors, &citing_authors, policy);

            match format {
                OutputFormat::Json => {
                    let value = json!({
                        "policy": policy,
                        "original": original_authors,
                        "citing": citing_authors,
                        "is_self_citation": is_self_citation,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Plain => println!("{}", is_self_citation),
                _ => {
                    println!("  {:<10} {}", "Original:", original_authors);
                    println!("  {:<10} {}", "Citing:", citing_authors);
                    println!("  {:<10} {}", "Policy:", policy.description());
                    if is_self_citation {
                        ui::print_status(Status::Warning, "Self-citation");
                    } else {
                        ui::print_status(Status::Success, "Independent citation");
                    }
                }
            }
        }
    }

    Ok(())
}

fn export_outcome(
    config: &Config,
    outcome: &AnalysisOutcome,
    report: &CitationReport,
    csv: Option<PathBuf>,
    summary_csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = csv {
        write_records_csv(&config.export.resolve(&path), &outcome.rows())?;
    }
    if let Some(path) = summary_csv {
        write_summary_csv(&config.export.resolve(&path), report)?;
    }
    if let Some(path) = json {
        let document = ReportDocument::new(Some(outcome.policy), report, &outcome.failures);
        write_report_json(&config.export.resolve(&path), &document)?;
    }
    Ok(())
}

fn output_report(
    report: &CitationReport,
    policy: Option<ClassificationPolicy>,
    failures: &[FetchFailure],
    format: OutputFormat,
    quiet: bool,
) {
    match format {
        OutputFormat::Json => {
            let document = ReportDocument::new(policy, report, failures);
            match serde_json::to_string_pretty(&document) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Failed to serialize report: {}", e),
            }
        }
        OutputFormat::Plain => {
            for summary in &report.publications {
                println!(
                    "{}\t{}\t{}/{}\t{}",
                    summary.title,
                    format_year(summary.year),
                    summary.tally.self_citations,
                    summary.tally.total,
                    summary.tally.percentage_label()
                );
            }
            println!(
                "overall\t-\t{}/{}\t{}",
                report.overall.self_citations,
                report.overall.total,
                report.overall.percentage_label()
            );
        }
        _ => {
            if !quiet {
                println!("{}", publications_table(report));
            }
            ui::print_overall(report, policy);
            ui::print_failures(failures);
        }
    }
}

fn publications_table(report: &CitationReport) -> Table {
    let [title_width, authors_width, ..] = report_table_columns(ui::terminal_width());

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Title", "Authors", "Year", "Cited", "Self", "Self %"]);

    for summary in &report.publications {
        let cited = summary
            .reported_citations
            .map(|reported| format!("{}/{}", summary.tally.total, reported))
            .unwrap_or_else(|| summary.tally.total.to_string());
        let percentage = summary
            .tally
            .percentage()
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(truncate_at_word(&summary.title, title_width)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&summary.authors_raw, authors_width)),
            Cell::new(format_year(summary.year)),
            Cell::new(cited).set_alignment(CellAlignment::Right),
            Cell::new(summary.tally.self_citations).set_alignment(CellAlignment::Right),
            Cell::new(percentage).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
