use anyhow::{Context, Result};
use clap::Parser;
use fastchurch::{config::PipelineConfig, export::ExportFormat, Pipeline};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Fetch members and events from the API, clean both, join them on the
/// event id and write the result to disk.
#[derive(Parser, Debug)]
#[command(name = "fastchurch", version, about)]
struct Args {
    /// YAML config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API root serving `/christians` and `/events`
    #[arg(long)]
    base_url: Option<String>,

    /// Full URL of the member list
    #[arg(long)]
    left_url: Option<String>,

    /// Full URL of the event list
    #[arg(long)]
    right_url: Option<String>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::from_yaml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(base) = &self.base_url {
            cfg.set_base_url(base);
        }
        if let Some(url) = self.left_url {
            cfg.left.url = url;
        }
        if let Some(url) = self.right_url {
            cfg.right.url = url;
        }
        if let Some(path) = self.output {
            cfg.output.path = path;
        }
        if let Some(format) = self.format {
            cfg.output.format = format;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.http.timeout_secs = secs;
        }
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fastchurch=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure ────────────────────────────────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        left = %cfg.left.url,
        right = %cfg.right.url,
        output = %cfg.output.path.display(),
        format = %cfg.output.format,
        "configured"
    );
    let pipeline = Pipeline::from_config(cfg).context("invalid configuration")?;

    // ─── 3) run ──────────────────────────────────────────────────────
    match pipeline.run().await {
        Ok(report) => {
            info!(
                path = %report.export.path.display(),
                rows = report.export.rows,
                columns = report.export.columns,
                "all done"
            );
            Ok(())
        }
        Err(e) => {
            error!("{}; exiting", e);
            std::process::exit(1);
        }
    }
}
