//! Year × location pivot of a metric column.

use std::collections::{BTreeMap, BTreeSet};

use crate::color::ChartPalette;
use crate::data::model::Dataset;
use crate::error::{LensError, Result};

use super::response::{ChartData, ChartDataset};

/// Running mean of the values that landed in one pivot cell.
#[derive(Debug, Default, Clone, Copy)]
struct Cell {
    sum: f64,
    count: usize,
}

impl Cell {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Pivot `dataset` into one chart series per location.
///
/// * rows lacking a year or a numeric metric value are skipped
/// * several values for the same (year, location) are averaged
/// * the year axis holds every year that received at least one value,
///   ascending; locations are ordered by name
/// * cells with no value are reported as `0.0`
///
/// Series colours cycle through `palette` by series index.
pub fn build_chart(
    dataset: &Dataset,
    location_column: &str,
    metric_column: &str,
    palette: &ChartPalette,
) -> Result<ChartData> {
    let year_idx = dataset
        .column_index("year")
        .ok_or_else(|| LensError::schema("Year column not found."))?;
    let loc_idx = dataset
        .column_index(location_column)
        .ok_or_else(|| LensError::schema("Location column not found."))?;
    let metric_idx = dataset
        .column_index(metric_column)
        .ok_or_else(|| LensError::schema("Metric column not found."))?;

    let mut cells: BTreeMap<(String, i64), Cell> = BTreeMap::new();
    let mut years: BTreeSet<i64> = BTreeSet::new();
    let mut locations: BTreeSet<String> = BTreeSet::new();

    for row in &dataset.rows {
        let (Some(year), Some(value)) = (
            row.values[year_idx].as_year(),
            row.values[metric_idx].as_f64(),
        ) else {
            continue;
        };
        let location = row.values[loc_idx].to_string();
        years.insert(year);
        locations.insert(location.clone());
        cells.entry((location, year)).or_default().push(value);
    }

    let datasets = locations
        .into_iter()
        .enumerate()
        .map(|(idx, location)| {
            let data = years
                .iter()
                .map(|&year| {
                    cells
                        .get(&(location.clone(), year))
                        .map(Cell::mean)
                        .unwrap_or(0.0)
                })
                .collect();
            ChartDataset {
                label: location,
                data,
                border_color: palette.color_for(idx),
            }
        })
        .collect();

    Ok(ChartData {
        labels: years.iter().map(|y| y.to_string()).collect(),
        datasets,
    })
}
