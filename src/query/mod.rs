/// Query layer: free text in, chart + table + summary out.
///
/// Pipeline:
/// ```text
///   "price trend in baner last 2 years"
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  find the location column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ location  │  which locations does the query name?  (none → hint)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ temporal  │  "last N years" window
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  intent   │  price or demand metric
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  pivot    │     │ summary  │
///   └──────────┘     └──────────┘
///        │                │
///        ▼                ▼
///        AnalysisResponse (+ table excerpt)
/// ```

pub mod intent;
pub mod location;
pub mod pivot;
pub mod response;
pub mod schema;
pub mod summary;
pub mod temporal;

use crate::color::ChartPalette;
use crate::config::AnalysisConfig;
use crate::data::filter::{filtered_indices, text_selection};
use crate::data::model::Dataset;
use crate::error::{LensError, Result};

use response::AnalysisResponse;

/// Stateless query pipeline; one instance serves every request.
#[derive(Debug, Clone)]
pub struct QueryPipeline {
    analysis: AnalysisConfig,
    palette: ChartPalette,
}

impl QueryPipeline {
    pub fn new(analysis: AnalysisConfig, palette: ChartPalette) -> Self {
        Self { analysis, palette }
    }

    /// Answer `query` against a freshly loaded `dataset`.
    pub fn run(&self, mut dataset: Dataset, query: &str) -> Result<AnalysisResponse> {
        let query = query.to_lowercase();

        let loc_col = schema::detect_column(&self.analysis.location_rules, &dataset.columns)
            .ok_or_else(|| LensError::schema("Location column not found."))?
            .to_string();
        log::debug!("location column: {loc_col}");

        dataset.trim_column_as_text(&loc_col);
        let available = dataset.distinct_text(&loc_col);
        let found = location::extract_locations(&available, &query);

        if found.is_empty() {
            log::info!("no location recognised in query {query:?}");
            return Ok(AnalysisResponse::no_match(location::no_match_hint(
                &available,
            )));
        }
        log::debug!("matched locations: {found:?}");

        let by_location = filtered_indices(&dataset, &text_selection(&loc_col, &found));
        let filtered = temporal::apply_last_years(dataset.select_rows(&by_location), &query);

        let metric = intent::select_metric(&query, &filtered.columns, &self.analysis)?;
        log::debug!("metric column: {} ({})", metric.column, metric.label);

        let chart = pivot::build_chart(&filtered, &loc_col, &metric.column, &self.palette)?;
        let summary = summary::generate_summary(
            &filtered,
            &metric.label,
            &found,
            &self.analysis.trend_columns,
            self.analysis.trend_order,
        );

        log::info!(
            "answered query for {} location(s): {} rows, {} years",
            found.len(),
            filtered.len(),
            chart.labels.len()
        );

        Ok(AnalysisResponse {
            summary,
            chart_data: Some(chart),
            table_data: filtered.records(self.analysis.table_row_limit),
        })
    }
}
