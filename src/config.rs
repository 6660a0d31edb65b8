//! Service configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock behaviour:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8000"
//! service_name = "Realty Lens"
//!
//! [storage]
//! data_dir = "data"
//!
//! [[analysis.location_rules]]
//! kind = "exact"
//! name = "final location"
//!
//! [[analysis.location_rules]]
//! kind = "contains"
//! any = ["loc", "area"]
//!
//! [chart]
//! palette = ["#2563eb", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::ChartPalette;
use crate::error::{ConfigError, Result};
use crate::query::schema::ColumnRule;
use crate::query::summary::TrendOrder;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
    pub chart: ChartConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else `realty-lens.toml` in the working
    /// directory, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            log::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let local = PathBuf::from("realty-lens.toml");
        if local.exists() {
            log::info!("Loading config from: {}", local.display());
            return Self::from_file(local);
        }

        log::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.analysis.location_rules.is_empty() {
            return Err(
                ConfigError::Invalid("analysis.location_rules must not be empty".into()).into(),
            );
        }
        if self.analysis.table_row_limit == 0 {
            return Err(ConfigError::Invalid("analysis.table_row_limit must be > 0".into()).into());
        }
        if self.storage.dataset_id.is_empty()
            || !self
                .storage
                .dataset_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid(format!(
                "storage.dataset_id '{}' must be non-empty [A-Za-z0-9_-]",
                self.storage.dataset_id
            ))
            .into());
        }
        ChartPalette::from_hex_codes(&self.chart.palette)
            .map_err(|e| ConfigError::Invalid(format!("chart.palette: {e}")))?;
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Name reported by `GET /test/`.
    pub service_name: String,
    /// Attach a permissive CORS layer.
    pub enable_cors: bool,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            service_name: "Realty Lens".to_string(),
            enable_cors: true,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Dataset storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the persisted upload.
    pub data_dir: PathBuf,
    /// Identifier of the single dataset slot the HTTP API reads and writes.
    pub dataset_id: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dataset_id: "default".to_string(),
        }
    }
}

/// A metric column together with the label shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub column: String,
    pub label: String,
}

/// Query heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ordered location-column detection rules; first hit wins.
    pub location_rules: Vec<ColumnRule>,
    /// Query words that switch the metric to demand.
    pub demand_keywords: Vec<String>,
    pub demand_metric: MetricSpec,
    pub price_metric: MetricSpec,
    /// Substrings that mark a column as a usable metric when the preferred one is missing.
    pub metric_fallback: Vec<String>,
    /// Substrings that mark the column used for trend classification.
    pub trend_columns: Vec<String>,
    /// Rows returned in `table_data`.
    pub table_row_limit: usize,
    pub trend_order: TrendOrder,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            location_rules: ColumnRule::default_location_rules(),
            demand_keywords: ["demand", "sales", "sold", "units", "volume"]
                .map(String::from)
                .to_vec(),
            demand_metric: MetricSpec {
                column: "flat_sold - igr".to_string(),
                label: "Units Sold (Demand)".to_string(),
            },
            price_metric: MetricSpec {
                column: "flat - weighted average rate".to_string(),
                label: "Price Per SqFt (INR)".to_string(),
            },
            metric_fallback: ["rate", "price"].map(String::from).to_vec(),
            trend_columns: ["rate", "price", "sold"].map(String::from).to_vec(),
            table_row_limit: 20,
            trend_order: TrendOrder::default(),
        }
    }
}

/// Chart rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Series colours as `#rrggbb`, cycled by dataset index.
    pub palette: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            palette: ChartPalette::DEFAULT_HEX.map(String::from).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LensError;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.analysis.table_row_limit, 20);
        assert_eq!(config.chart.palette.len(), 5);
        assert_eq!(config.analysis.location_rules.len(), 2);
    }

    #[test]
    fn partial_sections_override() {
        let config = Config::from_toml(
            r#"
            [server]
            service_name = "Sigmavalue"

            [analysis]
            table_row_limit = 5
            trend_order = "chronological"

            [[analysis.location_rules]]
            kind = "contains"
            any = ["locality"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server.service_name, "Sigmavalue");
        assert!(config.server.enable_cors);
        assert_eq!(config.analysis.table_row_limit, 5);
        assert_eq!(config.analysis.trend_order, TrendOrder::Chronological);
        assert_eq!(
            config.analysis.location_rules,
            vec![ColumnRule::Contains {
                any: vec!["locality".to_string()]
            }]
        );
        assert_eq!(config.analysis.price_metric.label, "Price Per SqFt (INR)");
    }

    #[test]
    fn bad_palette_is_rejected() {
        let err = Config::from_toml("[chart]\npalette = [\"#zzzzzz\"]").unwrap_err();
        assert!(matches!(err, LensError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn path_like_dataset_id_is_rejected() {
        let err = Config::from_toml("[storage]\ndataset_id = \"../x\"").unwrap_err();
        assert!(matches!(err, LensError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lens.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }
}
