//! Prose summary of the filtered rows.

use serde::{Deserialize, Serialize};

use crate::data::model::Dataset;

pub const NO_DATA_SUMMARY: &str = "No data available to generate a summary.";

/// Which rows count as "first" and "last" when classifying the trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendOrder {
    /// Sheet order after filtering. Only chronological if the sheet is.
    #[default]
    Row,
    /// Rows stably sorted by year first.
    Chronological,
}

/// Coarse direction of the market between the first and last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Upward,
    Decline,
    Stable,
}

impl Trend {
    fn phrase(self) -> &'static str {
        match self {
            Trend::Upward => "showing a **strong upward trend**",
            Trend::Decline => "showing a **decline**",
            Trend::Stable => "stable",
        }
    }
}

/// Classify the trend of the first column whose name contains one of
/// `trend_columns`, comparing its first and last rows.
pub fn classify_trend(dataset: &Dataset, trend_columns: &[String], order: TrendOrder) -> Trend {
    if dataset.len() < 2 {
        return Trend::Stable;
    }
    let Some(col) = dataset.columns.iter().position(|c| {
        trend_columns
            .iter()
            .any(|needle| c.contains(needle.as_str()))
    }) else {
        return Trend::Stable;
    };

    let mut rows: Vec<_> = dataset.rows.iter().collect();
    if order == TrendOrder::Chronological {
        if let Some(year_idx) = dataset.column_index("year") {
            rows.sort_by_key(|r| r.values[year_idx].as_year());
        }
    }

    let first = rows.first().and_then(|r| r.values[col].as_f64());
    let last = rows.last().and_then(|r| r.values[col].as_f64());
    match (first, last) {
        (Some(first), Some(last)) if last > first => Trend::Upward,
        (Some(first), Some(last)) if last < first => Trend::Decline,
        _ => Trend::Stable,
    }
}

/// Render the analysis report for `dataset`, the rows left after location
/// and time filtering.
pub fn generate_summary(
    dataset: &Dataset,
    metric_label: &str,
    locations: &[String],
    trend_columns: &[String],
    order: TrendOrder,
) -> String {
    if dataset.is_empty() {
        return NO_DATA_SUMMARY.to_string();
    }
    let years = dataset.years();
    let (Some(start_year), Some(end_year)) = (years.iter().min(), years.iter().max()) else {
        return NO_DATA_SUMMARY.to_string();
    };
    let trend = classify_trend(dataset, trend_columns, order);

    format!(
        "**Analysis Report for {}**\n\n\
         Analyzing the data from **{start_year} to {end_year}**, the market is {}. \
         This report is based on **{} data points**, highlighting key shifts in **{metric_label}**.",
        locations.join(", "),
        trend.phrase(),
        dataset.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn trend_cols() -> Vec<String> {
        ["rate", "price", "sold"].map(String::from).to_vec()
    }

    fn rates(rows: &[(i64, f64)]) -> Dataset {
        Dataset::new(
            vec!["year".into(), "loc".into(), "flat - weighted average rate".into()],
            rows.iter()
                .map(|(y, r)| {
                    vec![
                        CellValue::Integer(*y),
                        CellValue::String("Baner".into()),
                        CellValue::Float(*r),
                    ]
                })
                .collect(),
        )
    }

    fn summary(ds: &Dataset, order: TrendOrder) -> String {
        generate_summary(
            ds,
            "Price Per SqFt (INR)",
            &["Baner".to_string()],
            &trend_cols(),
            order,
        )
    }

    #[test]
    fn increasing_rate_is_upward() {
        let text = summary(&rates(&[(2020, 100.0), (2021, 120.0), (2022, 150.0)]), TrendOrder::Row);
        assert!(text.contains("strong upward trend"));
        assert!(text.contains("**Analysis Report for Baner**"));
        assert!(text.contains("**2020 to 2022**"));
        assert!(text.contains("**3 data points**"));
        assert!(text.contains("**Price Per SqFt (INR)**"));
    }

    #[test]
    fn decreasing_rate_is_decline() {
        let text = summary(&rates(&[(2020, 150.0), (2021, 100.0)]), TrendOrder::Row);
        assert!(text.contains("decline"));
    }

    #[test]
    fn single_row_is_stable() {
        let text = summary(&rates(&[(2020, 150.0)]), TrendOrder::Row);
        assert!(text.contains("the market is stable."));
    }

    #[test]
    fn empty_rows_give_no_data_message() {
        assert_eq!(summary(&rates(&[]), TrendOrder::Row), NO_DATA_SUMMARY);
    }

    #[test]
    fn row_order_is_taken_as_is_unless_chronological() {
        // Sheet lists 2022 before 2020: by row order the rate fell.
        let ds = rates(&[(2022, 200.0), (2020, 100.0)]);
        assert_eq!(classify_trend(&ds, &trend_cols(), TrendOrder::Row), Trend::Decline);
        assert_eq!(
            classify_trend(&ds, &trend_cols(), TrendOrder::Chronological),
            Trend::Upward
        );
    }

    #[test]
    fn no_trend_column_is_stable() {
        let ds = Dataset::new(
            vec!["year".into(), "loc".into()],
            vec![
                vec![CellValue::Integer(2020), CellValue::String("A".into())],
                vec![CellValue::Integer(2021), CellValue::String("A".into())],
            ],
        );
        assert_eq!(classify_trend(&ds, &trend_cols(), TrendOrder::Row), Trend::Stable);
    }
}
