use std::sync::Arc;

use serde::Serialize;

use crate::color::ChartPalette;
use crate::config::Config;
use crate::data::loader::{is_known_extension, load_bytes};
use crate::data::store::DatasetStore;
use crate::error::{LensError, Result};
use crate::query::QueryPipeline;
use crate::query::response::AnalysisResponse;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything a request handler needs, independent of HTTP.
pub struct AppState {
    /// Where uploads are kept.
    pub store: Arc<dyn DatasetStore>,

    /// Dataset slot the API reads and writes.
    pub dataset_id: String,

    /// Name reported by the health endpoint.
    pub service_name: String,

    /// Query heuristics and chart palette.
    pub pipeline: QueryPipeline,
}

/// Body of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub status: &'static str,
    pub message: &'static str,
    /// Header labels as they appear in the file.
    pub columns: Vec<String>,
    pub filename: String,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn DatasetStore>) -> Result<Self> {
        let palette = ChartPalette::from_hex_codes(&config.chart.palette)
            .map_err(|e| crate::error::ConfigError::Invalid(format!("chart.palette: {e}")))?;
        Ok(Self {
            store,
            dataset_id: config.storage.dataset_id.clone(),
            service_name: config.server.service_name.clone(),
            pipeline: QueryPipeline::new(config.analysis.clone(), palette),
        })
    }

    /// Parse `bytes` and, if they form a table, make them the current dataset.
    /// A file that fails to parse leaves the previous dataset in place.
    pub fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadSummary> {
        if !is_known_extension(filename) {
            log::warn!("unrecognised extension on {filename}, trying it as a workbook");
        }
        let dataset = load_bytes(filename, &bytes)
            .map_err(|e| LensError::InvalidUpload(format!("{e:#}")))?;
        let snapshot = self.store.put(&self.dataset_id, filename, bytes)?;
        log::info!(
            "stored {} as dataset '{}' v{} ({} rows, {} columns)",
            snapshot.filename,
            snapshot.dataset_id,
            snapshot.version,
            dataset.len(),
            dataset.columns.len()
        );
        Ok(UploadSummary {
            status: "success",
            message: "File uploaded successfully.",
            columns: dataset.raw_columns,
            filename: filename.to_string(),
        })
    }

    /// Answer a query against the dataset current at call time.
    pub fn analyze(&self, query: &str) -> Result<AnalysisResponse> {
        let snapshot = self
            .store
            .get(&self.dataset_id)?
            .ok_or(LensError::NotFound)?;
        log::debug!(
            "query pinned dataset '{}' v{}",
            snapshot.dataset_id,
            snapshot.version
        );
        let dataset = load_bytes(&snapshot.filename, &snapshot.bytes).map_err(LensError::parse)?;
        self.pipeline.run(dataset, query)
    }
}
