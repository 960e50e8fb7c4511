//! Roster lookup CLI.
//!
//! # Usage
//!
//! ```bash
//! # One-shot lookups
//! roster 542112345678
//! roster 张三 --grade 23
//! roster zs --json
//! roster 计算机 --mode fulltext
//!
//! # Interactive: one query per line on stdin
//! roster
//! ```

mod output;

use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use roster_lookup::config::{AppConfig, SourceKind};
use roster_lookup::core::logging;
use roster_lookup::core::roster::{
    LiveRoster, PartitionRestriction, Query, QueryResolver, SearchMode, SearchOutcome,
};

/// Look up students by ID, Chinese name, or pinyin initials.
#[derive(Parser)]
#[command(name = "roster", version, about)]
struct Cli {
    /// Query text. When omitted, queries are read line by line from stdin.
    query: Option<String>,

    /// Restrict to one enrollment year (2021..2024, 21..24) or "all"
    #[arg(short, long, default_value = "all")]
    grade: PartitionRestriction,

    /// Search mode: auto, id, name, initials, fulltext
    #[arg(short, long, default_value = "auto")]
    mode: SearchMode,

    /// Maximum number of results (overrides config)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Config file (default: platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read datasets from a local directory instead of the CDN
    #[arg(long)]
    local_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(cli.config.as_deref());
    if let Some(dir) = &cli.local_dir {
        config.source.kind = SourceKind::File;
        config.source.local_dir = Some(dir.clone());
    }
    if let Some(limit) = cli.limit {
        config.search.result_cap = limit;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    let _log_guard = logging::init(&config.logging, &config.log_dir());
    tracing::info!("{} v{} starting", roster_lookup::NAME, roster_lookup::VERSION);

    let source = config.source.build_source()?;
    let roster = LiveRoster::spawn(source, &config.source.partitions);
    let resolver = QueryResolver::new(config.search.result_cap, config.search.cache_capacity);

    match &cli.query {
        Some(text) => {
            let snapshot = roster.wait_until_loaded().await;
            let query = Query::new(text).in_partitions(cli.grade).with_mode(cli.mode);
            print_outcome(&resolver.search(&query, &snapshot), cli.json);
        }
        None => run_interactive(&cli, &roster, &resolver).await?,
    }

    Ok(())
}

/// Answer each stdin line against whatever has loaded so far.
async fn run_interactive(cli: &Cli, roster: &LiveRoster, resolver: &QueryResolver) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.into_diagnostic()? {
        let query = Query::new(&line).in_partitions(cli.grade).with_mode(cli.mode);
        if query.is_empty() {
            continue;
        }

        if roster.is_loading() {
            let pending: Vec<String> = roster
                .progress()
                .pending_partitions()
                .iter()
                .map(ToString::to_string)
                .collect();
            eprintln!(
                "{}",
                console::style(format!("仍在加载数据 [{}]，结果可能不完整", pending.join(", "))).yellow()
            );
        }

        let ticket = resolver.issue(query);
        if let Some(outcome) = resolver.resolve(&ticket, &roster.snapshot()) {
            print_outcome(&outcome, cli.json);
        }
    }

    tracing::debug!(cache = ?resolver.cache_stats(), "Interactive session finished");
    Ok(())
}

fn print_outcome(outcome: &SearchOutcome, json: bool) {
    if json {
        println!("{}", output::format_json(outcome));
    } else {
        println!("{}", output::format_human(outcome));
    }
}
