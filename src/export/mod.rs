// src/export/mod.rs
pub mod csv;
pub mod parquet;

use crate::error::Result;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Parquet,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Parquet => f.write_str("parquet"),
        }
    }
}

/// What ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub rows: usize,
    pub columns: usize,
    pub bytes: u64,
}

/// Write `table` to `path`. The file is built next to the target and renamed
/// over it, so the target is either the previous file or the complete new one.
#[tracing::instrument(level = "info", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn export<P: AsRef<Path>>(table: &Table, path: P, format: ExportFormat) -> Result<ExportReport> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = tmp_path_for(path);
    let written = match format {
        ExportFormat::Csv => csv::write_csv(table, &tmp_path),
        ExportFormat::Parquet => parquet::write_parquet(table, &tmp_path),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;

    let report = ExportReport {
        path: path.to_path_buf(),
        format,
        rows: table.num_rows(),
        columns: table.num_columns(),
        bytes: fs::metadata(path)?.len(),
    };
    info!(
        rows = report.rows,
        columns = report.columns,
        bytes = report.bytes,
        %format,
        "exported"
    );
    Ok(report)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
