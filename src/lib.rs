//! Realty Lens: natural-language trend queries over an uploaded
//! real-estate spreadsheet.
//!
//! Upload a sheet with a year column, a location column and price / sales
//! metrics, then ask things like "price trend in baner last 3 years" to get
//! a chart series, a table excerpt and a short written summary.

pub mod api;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod query;
pub mod state;

pub use api::create_router;
pub use config::Config;
pub use data::model::{CellValue, Dataset};
pub use data::store::{DatasetSnapshot, DatasetStore, FileDatasetStore, MemoryDatasetStore};
pub use error::{LensError, Result};
pub use query::response::{AnalysisResponse, ChartData, ChartDataset};
pub use query::QueryPipeline;
pub use state::AppState;
