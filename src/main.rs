use analytics::{AnalyticsEngine, Comparison, PerformanceReport};
use backtester::{BacktestEngine, BacktestRequest, BacktestResult, EngineOptions, load_benchmark_returns};
use clap::{Parser, Subcommand};
use configuration::{BacktestOverrides, DataSourceKind, Settings, load_settings};
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{
    DbPriceRepository, JsonDirPriceRepository, PriceRepository, connect, import_dir, run_migrations,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod logging;
mod summary;

/// The main entry point for the momn backtester.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file when present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    let _log_guard = logging::init(&settings.logging);

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => {
            args.overrides.apply(&mut settings);
            settings.validate()?;
            handle_run(args, settings).await
        }
        Commands::Import(args) => handle_import(args, settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backtests a periodically rebalanced momentum portfolio.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to ./config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest and compare it with the benchmark.
    Run(RunArgs),
    /// Load per-instrument JSON price files into the database.
    Import(ImportArgs),
}

#[derive(Parser)]
struct RunArgs {
    #[command(flatten)]
    overrides: BacktestOverrides,

    /// Write the full result (returns, snapshots, warnings, reports) as JSON.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ImportArgs {
    /// Directory of <instrument>.json files (defaults to data.json_dir).
    #[arg(long)]
    dir: Option<PathBuf>,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

#[derive(Serialize)]
struct RunReport<'a> {
    settings: &'a Settings,
    result: &'a BacktestResult,
    strategy: &'a PerformanceReport,
    comparison: Option<&'a Comparison>,
}

async fn price_repository(settings: &Settings) -> anyhow::Result<Arc<dyn PriceRepository>> {
    Ok(match settings.data.source {
        DataSourceKind::Postgres => {
            let pool = connect().await?;
            run_migrations(&pool).await?;
            Arc::new(DbPriceRepository::new(pool))
        }
        DataSourceKind::JsonDir => Arc::new(JsonDirPriceRepository::new(settings.data.json_dir.clone())),
    })
}

async fn handle_run(args: RunArgs, settings: Settings) -> anyhow::Result<()> {
    let bt = &settings.backtest;
    let repository = price_repository(&settings).await?;

    let request = BacktestRequest {
        start_date: bt.start_date,
        end_date: bt.end_date,
        frequency: bt.rebalance_frequency,
        universe: settings.universe_members()?.to_vec(),
        ranking_method: bt.ranking_method,
        top_n: bt.top_n,
        weighting: bt.weighting,
    };
    let options = EngineOptions {
        history_days: u64::from(bt.history_days),
        max_concurrency: bt.max_concurrency,
        time_budget: bt.time_budget_secs.map(Duration::from_secs),
        show_progress: true,
    };

    let engine = BacktestEngine::new(Arc::clone(&repository), options);
    let result = engine.run(&request).await?;

    let analytics = AnalyticsEngine::new();
    let strategy = analytics.summarize(&result.returns);

    let comparison = match &bt.benchmark {
        Some(benchmark) => {
            match load_benchmark_returns(repository.as_ref(), benchmark, bt.start_date, bt.end_date).await {
                Ok(bench_returns) => match analytics.compare(&result.returns, &bench_returns) {
                    Ok(cmp) => Some(cmp),
                    Err(e) => {
                        tracing::warn!(benchmark, error = %e, "Benchmark comparison skipped");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(benchmark, error = %e, "Benchmark returns unavailable");
                    None
                }
            }
        }
        None => None,
    };

    println!("{}", summary::performance_table(&strategy, comparison.as_ref(), bt.benchmark.as_deref()));
    if let Some(last) = result.snapshots.last() {
        println!("{}", summary::holdings_table(last));
    }
    if !result.warnings.is_empty() {
        println!("{}", summary::warnings_table(&result.warnings));
    }

    if let Some(path) = &args.output {
        let report = RunReport {
            settings: &settings,
            result: &result,
            strategy: &strategy,
            comparison: comparison.as_ref(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), "Run report written");
    }

    Ok(())
}

// ==============================================================================
// Import Command Logic
// ==============================================================================

/// Copies every JSON price file in the directory into `daily_prices`, at most
/// `backtest.max_concurrency` files at a time.
async fn handle_import(args: ImportArgs, settings: Settings) -> anyhow::Result<()> {
    let dir = args.dir.unwrap_or_else(|| settings.data.json_dir.clone());
    let source = JsonDirPriceRepository::new(dir.clone());
    let files = source.list_instruments().await?.len();

    tracing::info!(dir = %dir.display(), files, "Starting import");

    let pool = connect().await?;
    run_migrations(&pool).await?;
    let db_repo = DbPriceRepository::new(pool);

    // Set up the progress bar
    let progress_bar = ProgressBar::new(files as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let outcomes = import_dir(&source, &db_repo, settings.backtest.max_concurrency, |instrument| {
        progress_bar.set_message(format!("Imported {}", instrument));
        progress_bar.inc(1);
    })
    .await?;

    progress_bar.finish_with_message("Import complete!");

    let mut total = 0;
    let mut failed = 0;
    for outcome in outcomes {
        match outcome.result {
            Ok(written) => {
                tracing::debug!(instrument = %outcome.instrument, written, "Instrument imported");
                total += written;
            }
            Err(e) => {
                failed += 1;
                tracing::error!(instrument = %outcome.instrument, error = %e, "Import failed");
            }
        }
    }

    tracing::info!(rows = total, failed, "Import finished");
    if failed > 0 {
        anyhow::bail!("{failed} instrument file(s) failed to import");
    }
    Ok(())
}
