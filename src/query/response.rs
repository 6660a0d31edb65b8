//! Wire types returned by `/analyze/`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One line of the chart: a location's metric per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "borderColor")]
    pub border_color: String,
}

/// Chart payload: year labels shared by every dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// Full answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub summary: String,
    pub chart_data: Option<ChartData>,
    pub table_data: Vec<Map<String, JsonValue>>,
}

impl AnalysisResponse {
    /// Terminal answer for a query that named no known location.
    pub fn no_match(hint: String) -> Self {
        AnalysisResponse {
            summary: hint,
            chart_data: None,
            table_data: Vec::new(),
        }
    }
}
