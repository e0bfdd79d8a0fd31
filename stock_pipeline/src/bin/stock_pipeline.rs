use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use indicator_engine::IndicatorEngine;
use market_data_ingestor::{HistoricalFetcher, models::asset::{Symbol, normalize_ticker}, providers::build_provider};
use rand::{SeedableRng, rngs::StdRng};
use stock_pipeline::{
    config::PipelineConfig,
    pipeline::Pipeline,
    store::{PriceRow, PriceStore, SqliteStore},
    synthetic::{SyntheticModel, has_history, predict_for, sentiment_for},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Stock price ingestion and indicator pipeline")]
struct Cli {
    /// Path to pipeline.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create the schema and register the configured symbols.
    Init,
    /// Fetch, compute indicators, and upsert for every configured symbol.
    Ingest {
        /// Comma-separated tickers overriding the configured list.
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,
        /// Last day of the window (defaults to the current UTC date).
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print stored rows as JSON.
    Bars {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Newest rows only, newest first.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Synthetic next-day price prediction.
    Predict {
        #[arg(long)]
        symbol: String,
    },
    /// Synthetic sentiment summary.
    Sentiment {
        #[arg(long)]
        symbol: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_rows(rows: &[PriceRow]) -> Result<()> {
    let json: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| -> Result<serde_json::Value, serde_json::Error> {
            let mut v = serde_json::to_value(&r.bar)?;
            let ind = serde_json::to_value(r.indicators)?;
            if let (Some(obj), serde_json::Value::Object(extra)) = (v.as_object_mut(), ind) {
                obj.extend(extra);
            }
            Ok(v)
        })
        .collect::<Result<_, _>>()?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Open-ended range bounds. Dates are stored as ISO text, so stay within four-digit years.
fn date_bounds() -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN);
    let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
    (first, last)
}

fn select_symbols(config: &PipelineConfig, requested: Option<Vec<String>>) -> Vec<Symbol> {
    match requested {
        None => config.symbols(),
        Some(tickers) => tickers
            .iter()
            .map(|t| {
                let ticker = normalize_ticker(t);
                let name = config
                    .symbols
                    .iter()
                    .find(|(k, _)| normalize_ticker(k) == ticker)
                    .map_or_else(|| ticker.clone(), |(_, v)| v.clone());
                Symbol::new(ticker, name)
            })
            .collect(),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    let database_url = config.database_url();
    let mut store = SqliteStore::open(&database_url)
        .with_context(|| format!("opening database {database_url}"))?;

    match cli.cmd {
        Cmd::Init => {
            for symbol in config.symbols() {
                let record = store.register_symbol(&symbol)?;
                info!(symbol = %record.ticker, name = %record.name, "symbol ready");
            }
        }
        Cmd::Ingest { symbols, today } => {
            let symbols = select_symbols(&config, symbols);
            let today = today.unwrap_or_else(|| Utc::now().date_naive());

            let provider = build_provider(config.provider)?;
            let fetcher = HistoricalFetcher::new(provider, config.fetcher_options());
            let engine = IndicatorEngine::default();

            let report = Pipeline::new(&fetcher, &engine, &mut store)
                .run(&symbols, today)
                .await;

            for (symbol, err) in report.failed() {
                eprintln!("FAILED {symbol}: {err}");
            }
            eprintln!(
                "SUMMARY: {} succeeded, {} failed",
                report.succeeded().len(),
                report.failed().len()
            );
            if report.all_failed() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Cmd::Bars {
            symbol,
            start,
            end,
            limit,
        } => {
            if !has_history(&mut store, &symbol)? {
                bail!("historical data unavailable for {symbol}");
            }
            let rows = match (start, end, limit) {
                (None, None, Some(limit)) => store.latest_rows(&symbol, limit)?,
                (start, end, limit) => {
                    let (first, last) = date_bounds();
                    let start = start.unwrap_or(first);
                    let end = end.unwrap_or(last);
                    let mut rows = store.bars_in_range(&symbol, start, end)?;
                    if let Some(limit) = limit {
                        rows.truncate(limit);
                    }
                    rows
                }
            };
            print_rows(&rows)?;
        }
        Cmd::Predict { symbol } => {
            let mut model = SyntheticModel::new(StdRng::from_os_rng());
            let today = Utc::now().date_naive();
            let prediction = predict_for(&mut store, &mut model, &symbol, today)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Cmd::Sentiment { symbol } => {
            let mut model = SyntheticModel::new(StdRng::from_os_rng());
            let sentiment = sentiment_for(&mut store, &mut model, &symbol, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&sentiment)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();
    run(Cli::parse()).await
}
