//! ARIA command-line interface
//!
//! Matches the flows of a CSV inventory to processes of a database snapshot
//! and, for `assess`, scores them and draws waterfall charts.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use matching::ai::OpenAiChat;
use matching::{
    build_query, chart, pipeline::build_query_with_extra, table, Assessor, BatchReport,
    ChatModel, ChatSelector, DatabaseSnapshot, FactorEngine, LabelSelector, MemoryDatabase,
    OfflineChat, RankingSelector, RowOutcome,
};
use openai_client::OpenAIClient;
use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "aria")]
#[command(about = "Match LCA flows to database processes and assess their impacts")]
struct Cli {
    /// TOML file with matching settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use rule-based selection and no chat backend
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, select and parse a dataset for every flow
    Match {
        /// Input flow table (CSV)
        #[arg(long)]
        flows: PathBuf,

        /// Process database snapshot (JSON)
        #[arg(long)]
        database: PathBuf,

        /// Output table
        #[arg(long, default_value = "matched.csv")]
        out: PathBuf,

        /// Write the per-row report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Match flows, then score their impacts
    Assess {
        /// Input flow table (CSV)
        #[arg(long)]
        flows: PathBuf,

        /// Process database snapshot (JSON)
        #[arg(long)]
        database: PathBuf,

        /// Output table
        #[arg(long, default_value = "assessment.csv")]
        out: PathBuf,

        /// Directory for waterfall charts (SVG)
        #[arg(long)]
        charts: Option<PathBuf>,

        /// Write the per-row report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the wildcard query built for a term
    Query {
        term: String,

        /// Extra words appended to the term
        #[arg(long)]
        extra: Option<String>,
    },
}

type CliAssessor =
    Assessor<MemoryDatabase, FactorEngine, Arc<dyn ChatModel>, Arc<dyn LabelSelector>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,matching=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query { term, extra } => {
            cmd_query(&term, extra.as_deref());
            Ok(())
        }
        Commands::Match {
            flows,
            database,
            out,
            report,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd_match(config, cli.offline, &flows, &database, &out, report.as_deref()).await
        }
        Commands::Assess {
            flows,
            database,
            out,
            charts,
            report,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            cmd_assess(
                config,
                cli.offline,
                &flows,
                &database,
                &out,
                charts.as_deref(),
                report.as_deref(),
            )
            .await
        }
    }
}

fn cmd_query(term: &str, extra: Option<&str>) {
    let term = term.trim().to_lowercase();
    let query = match extra {
        Some(extra) => build_query_with_extra(&term, extra),
        None => build_query(&term),
    };
    println!("{}", query);
}

/// Chat backend and selector: OpenAI by default, rule-based offline.
fn collaborators(
    config: &Config,
    offline: bool,
) -> Result<(Arc<dyn ChatModel>, Arc<dyn LabelSelector>)> {
    if offline {
        tracing::info!("Offline mode: rule-based selection, no alternative terms");
        let chat: Arc<dyn ChatModel> = Arc::new(OfflineChat);
        let selector: Arc<dyn LabelSelector> = Arc::new(RankingSelector);
        return Ok((chat, selector));
    }

    let api_key = config
        .openai_api_key
        .as_ref()
        .context("OPENAI_API_KEY must be set (or pass --offline)")?;

    let mut client = OpenAIClient::new(api_key.expose_secret())
        .with_timeout(config.request_timeout)
        .context("failed to build HTTP client")?;
    if let Some(base_url) = &config.openai_base_url {
        client = client.with_base_url(base_url);
    }

    let chat: Arc<dyn ChatModel> =
        Arc::new(OpenAiChat::new(client).with_model(&config.matching.model));
    let selector: Arc<dyn LabelSelector> = Arc::new(ChatSelector::new(
        chat.clone(),
        config.matching.system_message.clone(),
        config.matching.selection.clone(),
    ));
    Ok((chat, selector))
}

fn build_assessor(config: Config, offline: bool, database: &Path) -> Result<CliAssessor> {
    let snapshot = DatabaseSnapshot::load(database)
        .with_context(|| format!("failed to load database snapshot {}", database.display()))?;
    let engine = FactorEngine::from_snapshot(&snapshot);
    let database = MemoryDatabase::from_snapshot(snapshot);
    let (chat, selector) = collaborators(&config, offline)?;

    Ok(Assessor::new(database, engine, chat, selector, config.matching))
}

fn read_flows(assessor: &CliAssessor, flows: &Path) -> Result<Vec<matching::FlowRecord>> {
    let config = assessor.config();
    table::read_flows(flows, &config.columns, config.max_rows)
        .with_context(|| format!("failed to read flow table {}", flows.display()))
}

async fn cmd_match(
    config: Config,
    offline: bool,
    flows: &Path,
    database: &Path,
    out: &Path,
    report_path: Option<&Path>,
) -> Result<()> {
    let assessor = build_assessor(config, offline, database)?;
    let flows = read_flows(&assessor, flows)?;

    let banner = format!("🔎 Matching {} flows...", flows.len());
    println!("{}", banner.as_str().bright_blue().bold());
    let outcome = assessor.match_flows(&flows).await?;

    table::write_resolved(out, &assessor.config().columns, &outcome.resolved, &outcome.parsed)?;
    write_report(report_path, &outcome.report)?;

    println!("{}", "✅ Matching complete".bright_green().bold());
    println!("   Parsed rows: {}", outcome.parsed.len());
    print_summary(&outcome.report, flows.len());
    println!("   Table: {}", out.display());
    Ok(())
}

async fn cmd_assess(
    config: Config,
    offline: bool,
    flows: &Path,
    database: &Path,
    out: &Path,
    charts: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let assessor = build_assessor(config, offline, database)?;
    let flows = read_flows(&assessor, flows)?;

    let banner = format!("🔎 Assessing {} flows...", flows.len());
    println!("{}", banner.as_str().bright_blue().bold());
    let assessment = assessor.assess(&flows).await?;

    table::write_assessed(out, &assessor.config().columns, &assessment.assessed)?;
    write_report(report_path, &assessment.report)?;

    println!("{}", "✅ Assessment complete".bright_green().bold());
    println!("   Assessed rows: {}", assessment.assessed.len());
    print_summary(&assessment.report, flows.len());
    println!("   Table: {}", out.display());

    if let Some(dir) = charts {
        let written = chart::write_charts(dir, &assessment.assessed)?;
        println!("   Charts: {} written to {}", written.len(), dir.display());
    }
    Ok(())
}

fn write_report(path: Option<&Path>, report: &BatchReport) -> Result<()> {
    if let Some(path) = path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}

fn describe(outcome: &RowOutcome) -> String {
    match outcome {
        RowOutcome::SelectionFailed { error } => error.clone(),
        RowOutcome::ParseFailed { label, reason } if label.is_empty() => {
            format!("no dataset selected ({})", reason)
        }
        RowOutcome::ParseFailed { label, reason } => format!("unparseable label '{}' ({})", label, reason),
        RowOutcome::NoMatch {
            process_name,
            location,
        } => format!("no process '{}' in {}", process_name, location),
        RowOutcome::NoImpacts { skipped } => format!("all {} methods skipped", skipped.len()),
        RowOutcome::Resolved { .. } | RowOutcome::Evaluated { .. } => String::new(),
    }
}

fn print_summary(report: &BatchReport, rows: usize) {
    println!(
        "   Rows: {}, labelled: {}, failed: {}",
        rows,
        report.labelled_count(),
        report.failure_count()
    );
    for failure in report.failures() {
        let reason = describe(&failure.outcome);
        println!(
            "   {} row {} ({}): {}",
            "✗".red(),
            failure.row,
            failure.activity,
            reason.as_str().dimmed()
        );
    }
}
