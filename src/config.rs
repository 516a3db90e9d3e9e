// src/config.rs
use crate::error::{PipelineError, Result};
use crate::export::ExportFormat;
use crate::reconcile::JoinSpec;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_OUTPUT: &str = "merged_data.csv";

/// One "list all" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
}

impl SourceConfig {
    fn at(base: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("{}/{}", base.trim_end_matches('/'), name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: ExportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            format: ExportFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything one run needs. Left is the member list, right the events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub left: SourceConfig,
    pub right: SourceConfig,
    pub join: JoinSpec,
    pub output: OutputConfig,
    pub http: HttpConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl PipelineConfig {
    /// Defaults with both sources under `base`.
    pub fn with_base_url(base: &str) -> Self {
        Self {
            left: SourceConfig::at(base, "christians"),
            right: SourceConfig::at(base, "events"),
            join: JoinSpec::default(),
            output: OutputConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Point both sources at `base`, keeping their names.
    pub fn set_base_url(&mut self, base: &str) {
        self.left = SourceConfig::at(base, &self.left.name);
        self.right = SourceConfig::at(base, &self.right.name);
    }

    /// Load a YAML file; keys left out fall back to defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("reading {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for src in [&self.left, &self.right] {
            let url = Url::parse(&src.url).map_err(|e| {
                PipelineError::Config(format!("source `{}`: bad url {}: {}", src.name, src.url, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(PipelineError::Config(format!(
                    "source `{}`: unsupported scheme `{}`",
                    src.name,
                    url.scheme()
                )));
            }
        }
        if self.join.key.is_empty() || self.join.rename_to.is_empty() {
            return Err(PipelineError::Config("join key must not be empty".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(PipelineError::Config("http.timeout_secs must be > 0".into()));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(PipelineError::Config("output.path must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_local_api() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.left.url, "http://127.0.0.1:8000/christians");
        assert_eq!(cfg.right.url, "http://127.0.0.1:8000/events");
        assert_eq!(cfg.join.key, "event_id");
        assert_eq!(cfg.join.rename_from, "id");
        assert_eq!(cfg.output.path, PathBuf::from("merged_data.csv"));
        assert_eq!(cfg.http.timeout(), Duration::from_secs(30));
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "output:\n  path: out/merged.parquet\n  format: parquet\nhttp:\n  timeout_secs: 5"
        )
        .unwrap();

        let cfg = PipelineConfig::from_yaml_file(tmp.path()).unwrap();
        assert_eq!(cfg.output.format, ExportFormat::Parquet);
        assert_eq!(cfg.output.path, PathBuf::from("out/merged.parquet"));
        assert_eq!(cfg.http.timeout_secs, 5);
        assert_eq!(cfg.left, PipelineConfig::default().left);
    }

    #[test]
    fn base_url_rewrites_both_sources() {
        let mut cfg = PipelineConfig::default();
        cfg.set_base_url("https://church.example.org/api/");
        assert_eq!(cfg.left.url, "https://church.example.org/api/christians");
        assert_eq!(cfg.right.url, "https://church.example.org/api/events");
    }

    #[test]
    fn rejects_bad_urls_and_zero_timeout() {
        let bad_url = "left:\n  name: christians\n  url: not a url\n";
        assert!(matches!(
            PipelineConfig::from_yaml_str(bad_url),
            Err(PipelineError::Config(_))
        ));

        let ftp = "right:\n  name: events\n  url: ftp://host/events\n";
        assert!(PipelineConfig::from_yaml_str(ftp).is_err());

        let zero = "http:\n  timeout_secs: 0\n";
        assert!(PipelineConfig::from_yaml_str(zero).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = PipelineConfig::from_yaml_file("/nonexistent/fastchurch.yaml").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
