//! vault — Knowledge Vault CLI
//!
//! Classifies a free-text study query into a subject, composes a
//! summary / deep-dive / visualization / sources answer from local
//! notes, the symbolic math evaluator, or the remote completion
//! service, prints it, and appends the record to the vault history.
//!
//! # Subcommands
//! - `analyze <query> [--remote] [--notion] [--no-save]`
//! - `history [-n <limit>]`
//! - `plot <expression>`

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use vault_core::{
    choose_strategy, compose, evaluator, AnalysisRecord, CompletionClient, CompletionConfig,
    HistoryLog, KnowledgeBase, NotionClient, NotionConfig, Strategy, VaultConfig,
};

const DEFAULT_HISTORY_LIMIT: usize = 15;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "vault",
    version,
    about = "Knowledge Vault — classify, analyze, and archive study queries"
)]
struct Cli {
    /// Config file path (defaults are used when the file is absent)
    #[arg(short, long, default_value = "vault.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a query and append the result to the vault history
    Analyze {
        /// The question or topic to analyze
        query: String,

        /// Forward the raw query to the completion service instead of
        /// composing locally
        #[arg(long)]
        remote: bool,

        /// Also save the record to the remote note-storage database
        #[arg(long)]
        notion: bool,

        /// Skip appending to the local history log
        #[arg(long)]
        no_save: bool,
    },

    /// Show the most recent vault history records
    History {
        /// Maximum number of records to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Sample f(x) over [-5, 5] and draw a terminal chart
    Plot {
        /// A function of x, e.g. 'x**2' or 'sin(x)'
        expression: String,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let config = match VaultConfig::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("vault: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Analyze {
            query,
            remote,
            notion,
            no_save,
        } => run_analyze(&config, &query, remote, notion, no_save).await,
        Commands::History { limit } => run_history(&config, limit),
        Commands::Plot { expression } => run_plot(&expression),
    }
}

// ============================================================================
// Analyze
// ============================================================================

async fn run_analyze(
    config: &VaultConfig,
    query: &str,
    remote: bool,
    notion: bool,
    no_save: bool,
) -> anyhow::Result<()> {
    let kb = KnowledgeBase::builtin();
    let subject = kb.classify(query);
    println!("Detected subject: {}", subject);

    let strategy = choose_strategy(subject, query, remote);

    // The only network call on the composition path, awaited to completion.
    let completion_text = if strategy == Strategy::Completion {
        let cfg = CompletionConfig::new(
            None,
            config.completion.model.clone(),
            config.completion.max_tokens,
            config.completion.temperature,
            config.completion.top_p,
        );
        match CompletionClient::new(cfg) {
            Ok(client) => client.complete_or_none(query).await,
            Err(e) => {
                eprintln!("vault: {}", e);
                None
            }
        }
    } else {
        None
    };

    let analysis = compose(&kb, subject, query, strategy, completion_text.as_deref());

    println!("\n== Summary ==\n{}", analysis.summary);
    println!("\n== Deep Dive ==\n{}", analysis.deep_dive);
    println!("\n== Visualization ==\n{}", analysis.visualization);
    println!("\n== Sources ==\n{}", analysis.sources);

    let record = analysis.into_record(subject, query);

    if notion {
        save_to_notion(config, &record).await;
    }

    if !no_save {
        let log = HistoryLog::new(&config.history.path);
        log.append(&record)?;
        println!("\nSaved to {}.", config.history.path);
    }

    Ok(())
}

/// Remote save is best-effort: failures are surfaced but never abort the
/// analysis or the local append.
async fn save_to_notion(config: &VaultConfig, record: &AnalysisRecord) {
    let cfg = NotionConfig::new(None, config.notion.database_id.clone());
    match NotionClient::new(cfg) {
        Ok(client) => match client.create_page(record).await {
            Ok(()) => println!("Saved to the note-storage database."),
            Err(e) => eprintln!("vault: note-storage save failed: {}", e),
        },
        Err(e) => eprintln!("vault: {}", e),
    }
}

// ============================================================================
// History
// ============================================================================

fn run_history(config: &VaultConfig, limit: usize) -> anyhow::Result<()> {
    let log = HistoryLog::new(&config.history.path);
    let records = match log.tail(limit) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("vault: could not read {}: {}", config.history.path, e);
            std::process::exit(1);
        }
    };

    if records.is_empty() {
        println!("No history yet. Run an analysis to create entries.");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_history_line(record));
    }
    Ok(())
}

/// One line per record: timestamp, subject, query, truncated summary.
fn format_history_line(record: &AnalysisRecord) -> String {
    let summary: String = record.summary.chars().take(60).collect();
    let ellipsis = if record.summary.chars().count() > 60 {
        "…"
    } else {
        ""
    };
    format!(
        "{}  [{}]  {} — {}{}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.subject,
        record.query,
        summary,
        ellipsis
    )
}

// ============================================================================
// Plot
// ============================================================================

const CHART_WIDTH: usize = 61;
const CHART_ROW_STEP: usize = 5;

fn run_plot(expression: &str) -> anyhow::Result<()> {
    let points = match evaluator::sample_curve(expression) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("vault: could not plot. Check function format. Error: {}", e);
            std::process::exit(1);
        }
    };

    let y_min = points.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(f64::NEG_INFINITY, f64::max);

    println!("f(x) = {}   x in [-5, 5], y in [{:.3}, {:.3}]", expression, y_min, y_max);
    for (x, y) in points.iter().step_by(CHART_ROW_STEP) {
        println!("{}", chart_row(*x, *y, y_min, y_max, CHART_WIDTH));
    }
    Ok(())
}

/// Render one chart row: the x value, a marker positioned by the
/// normalized y, and the y value.
fn chart_row(x: f64, y: f64, y_min: f64, y_max: f64, width: usize) -> String {
    let span = y_max - y_min;
    let frac = if span.abs() < f64::EPSILON {
        0.5
    } else {
        (y - y_min) / span
    };
    let col = ((width - 1) as f64 * frac).round() as usize;

    let mut bar: Vec<char> = vec![' '; width];
    bar[col] = '*';
    let bar: String = bar.into_iter().collect();
    format!("{:>6.1} |{}| {:.3}", x, bar, y)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vault_core::Category;

    fn mock_record(query: &str, summary: &str) -> AnalysisRecord {
        AnalysisRecord {
            timestamp: Utc.with_ymd_and_hms(2026, 2, 23, 10, 0, 0).unwrap(),
            subject: Category::Science,
            query: query.to_string(),
            summary: summary.to_string(),
            deep_dive: "deep".to_string(),
            sources: "src".to_string(),
        }
    }

    #[test]
    fn test_history_line_contains_all_fields() {
        let line = format_history_line(&mock_record("why is the sky blue", "Rayleigh scattering"));
        assert!(line.contains("2026-02-23 10:00:00"));
        assert!(line.contains("[Science]"));
        assert!(line.contains("why is the sky blue"));
        assert!(line.contains("Rayleigh scattering"));
    }

    #[test]
    fn test_history_line_truncates_long_summaries() {
        let long = "S".repeat(100);
        let line = format_history_line(&mock_record("q", &long));
        assert!(line.contains(&"S".repeat(60)));
        assert!(!line.contains(&"S".repeat(61)));
        assert!(line.ends_with('…'));
    }

    #[test]
    fn test_chart_row_places_extremes_at_edges() {
        let row = chart_row(-5.0, 0.0, 0.0, 10.0, 61);
        assert_eq!(row.find('*'), row.find('|').map(|i| i + 1));

        let row = chart_row(5.0, 10.0, 0.0, 10.0, 61);
        let last_pipe = row.rfind('|').unwrap();
        assert_eq!(row.find('*'), Some(last_pipe - 1));
    }

    #[test]
    fn test_chart_row_centers_constant_functions() {
        let row = chart_row(0.0, 3.0, 3.0, 3.0, 61);
        let first_pipe = row.find('|').unwrap();
        assert_eq!(row.find('*'), Some(first_pipe + 1 + 30));
    }
}
