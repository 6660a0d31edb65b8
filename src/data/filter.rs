use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Selection that keeps rows whose `column` holds one of `values` as text.
pub fn text_selection(column: &str, values: &[String]) -> FilterState {
    let selected = values
        .iter()
        .map(|v| CellValue::String(v.clone()))
        .collect();
    FilterState::from([(column.to_string(), selected)])
}

/// Return indices of rows whose value in each filtered column is one of the
/// selected values. A column missing from the dataset matches no row.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    let resolved: Vec<(Option<usize>, &BTreeSet<CellValue>)> = filters
        .iter()
        .map(|(col, selected)| (dataset.column_index(col), selected))
        .collect();

    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            resolved.iter().all(|(idx, selected)| match idx {
                Some(idx) => selected.contains(&row.values[*idx]),
                None => false,
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of rows whose `year` is at least `min_year`.
/// Rows without a readable year never pass.
pub fn year_at_least_indices(dataset: &Dataset, min_year: i64) -> Vec<usize> {
    let Some(idx) = dataset.column_index("year") else {
        return Vec::new();
    };
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.values[idx].as_year().is_some_and(|y| y >= min_year))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let rows = [(2019, "Baner"), (2020, "Wakad"), (2021, "Baner")]
            .iter()
            .map(|(y, l)| vec![CellValue::Integer(*y), CellValue::String(l.to_string())])
            .collect();
        Dataset::new(vec!["year".into(), "loc".into()], rows)
    }

    #[test]
    fn text_selection_keeps_matching_rows() {
        let ds = sample();
        let filters = text_selection("loc", &["Baner".to_string()]);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 2]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let ds = sample();
        let filters = text_selection("loc", &[]);
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn unknown_column_hides_everything() {
        let ds = sample();
        let filters = text_selection("area", &["Baner".to_string()]);
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn year_threshold_is_inclusive() {
        let ds = sample();
        assert_eq!(year_at_least_indices(&ds, 2020), vec![1, 2]);
    }
}
