//! Intent detection: which metric a query is about.

use crate::config::{AnalysisConfig, MetricSpec};
use crate::error::{LensError, Result};

/// The metric column picked for a query, and how to label it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricChoice {
    pub column: String,
    pub label: String,
}

/// Preferred metric for `query` (lower-cased), ignoring which columns exist.
pub fn preferred_metric<'a>(query: &str, analysis: &'a AnalysisConfig) -> &'a MetricSpec {
    let wants_demand = analysis
        .demand_keywords
        .iter()
        .any(|word| query.contains(word.as_str()));
    if wants_demand {
        &analysis.demand_metric
    } else {
        &analysis.price_metric
    }
}

/// Resolve the metric column against the columns actually present.
///
/// When the preferred column is missing, the first column mentioning one of
/// the fallback substrings is used; the label stays that of the preferred
/// metric.
pub fn select_metric(
    query: &str,
    columns: &[String],
    analysis: &AnalysisConfig,
) -> Result<MetricChoice> {
    let preferred = preferred_metric(query, analysis);
    let column = if columns.iter().any(|c| *c == preferred.column) {
        preferred.column.clone()
    } else {
        columns
            .iter()
            .find(|c| {
                analysis
                    .metric_fallback
                    .iter()
                    .any(|needle| c.contains(needle.as_str()))
            })
            .cloned()
            .ok_or_else(|| LensError::schema("Metric column not found."))?
    };
    Ok(MetricChoice {
        column,
        label: preferred.label.clone(),
    })
}
