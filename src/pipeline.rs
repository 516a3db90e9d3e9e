// src/pipeline.rs
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::export::{export, ExportReport};
use crate::fetch::SourceReader;
use crate::process::normalize_with_stats;
use crate::reconcile::reconcile;
use crate::table::Table;
use reqwest::Client;
use std::fmt;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Normalize,
    Merge,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Merge => "merge",
            Stage::Export => "export",
        })
    }
}

/// Shape of one table after one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTrace {
    pub stage: Stage,
    pub source: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub trace: Vec<StageTrace>,
    pub export: ExportReport,
}

/// fetch → normalize → merge → export, each stage terminal on failure.
pub struct Pipeline {
    config: PipelineConfig,
    reader: SourceReader,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, client: Client) -> Self {
        Self {
            config,
            reader: SourceReader::new(client),
        }
    }

    /// Validate `config` and build an HTTP client with its timeout.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| PipelineError::Config(format!("building HTTP client: {}", e)))?;
        Ok(Self::new(config, client))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[tracing::instrument(level = "info", skip(self), fields(output = %self.config.output.path.display()))]
    pub async fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        let cfg = &self.config;
        let mut trace = Vec::new();

        // ─── 1) fetch ────────────────────────────────────────────────────
        let left = self.reader.fetch(&cfg.left.url).await;
        record(&mut trace, Stage::Fetch, &cfg.left.name, &left);
        let right = self.reader.fetch(&cfg.right.url).await;
        record(&mut trace, Stage::Fetch, &cfg.right.name, &right);

        for (name, table) in [(&cfg.left.name, &left), (&cfg.right.name, &right)] {
            if table.is_empty() {
                warn!(source = %name, "one or more datasets are empty; exiting");
                return Err(PipelineError::EmptySource {
                    source_name: name.clone(),
                });
            }
        }

        // ─── 2) normalize ────────────────────────────────────────────────
        let (left, left_stats) = normalize_with_stats(left);
        record(&mut trace, Stage::Normalize, &cfg.left.name, &left);
        let (right, right_stats) = normalize_with_stats(right);
        record(&mut trace, Stage::Normalize, &cfg.right.name, &right);
        info!(source = %cfg.left.name, stats = ?left_stats, "normalized");
        info!(source = %cfg.right.name, stats = ?right_stats, "normalized");

        left.log_summary(&cfg.left.name);
        right.log_summary(&cfg.right.name);

        // ─── 3) merge ────────────────────────────────────────────────────
        let merged = reconcile(left, right, &cfg.join)?;
        record(&mut trace, Stage::Merge, "merged", &merged);
        merged.log_summary("merged");

        // ─── 4) export ───────────────────────────────────────────────────
        let report = export(&merged, &cfg.output.path, cfg.output.format)?;
        trace.push(StageTrace {
            stage: Stage::Export,
            source: "merged".into(),
            rows: report.rows,
            columns: report.columns,
        });

        info!(
            path = %report.path.display(),
            elapsed = ?start.elapsed(),
            "merged data saved"
        );
        Ok(RunReport {
            trace,
            export: report,
        })
    }
}

fn record(trace: &mut Vec<StageTrace>, stage: Stage, source: &str, table: &Table) {
    let (rows, columns) = table.shape();
    info!(%stage, source, rows, columns, "stage complete");
    trace.push(StageTrace {
        stage,
        source: source.to_string(),
        rows,
        columns,
    });
}
