// src/bin/inspect_source.rs
//
// Fetch one collection endpoint, normalize it and print a column profile.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fastchurch::{
    fetch::{table_from_payload, SourceReader},
    model::RecordKind,
    process::normalize_with_stats,
};
use reqwest::Client;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "inspect_source", about = "Profile one API collection")]
struct Args {
    /// e.g. http://127.0.0.1:8000/events
    url: String,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Skip normalization and profile the raw records
    #[arg(long)]
    raw: bool,

    /// Also deserialize every record as this type and list the failures
    #[arg(long, value_enum)]
    typed: Option<RecordKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .context("building HTTP client")?;

    let reader = SourceReader::new(client);
    let payload = reader
        .fetch_payload(&args.url)
        .await
        .with_context(|| format!("fetching {}", args.url))?;
    if let Some(kind) = args.typed {
        let items = payload.as_array().map(Vec::as_slice).unwrap_or_default();
        let failures = kind.check(items);
        println!(
            "typed {:?}: {} of {} records ok",
            kind,
            items.len() - failures.len(),
            items.len()
        );
        for (i, e) in &failures {
            println!("  record {}: {}", i, e);
        }
    }
    let table = table_from_payload(&args.url, payload)
        .with_context(|| format!("reading {}", args.url))?;
    let table = if args.raw {
        table
    } else {
        let (table, stats) = normalize_with_stats(table);
        println!("normalize: {:?}", stats);
        table
    };
    if table.is_empty() {
        bail!("{} produced an empty table", args.url);
    }

    let (rows, columns) = table.shape();
    println!("=== {} ===", args.url);
    println!("Rows:    {}", rows);
    println!("Columns: {}", columns);
    println!();
    println!(
        "{:<24} {:<10} {:>9} {:>9} {:>7}  {}",
        "column", "dtype", "non-null", "unique", "freq", "top"
    );
    println!("{:-<80}", "");
    for s in table.describe() {
        println!(
            "{:<24} {:<10} {:>9} {:>9} {:>7}  {}",
            s.name,
            s.dtype,
            s.non_null,
            s.unique,
            s.freq,
            s.top.unwrap_or_default()
        );
    }
    Ok(())
}
