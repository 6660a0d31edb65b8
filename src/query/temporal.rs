//! "last N years" handling.

use std::sync::OnceLock;

use regex::Regex;

use crate::data::filter::year_at_least_indices;
use crate::data::model::Dataset;

fn last_years_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)last (\d+) years").expect("static regex"))
}

/// The `N` of a "last N years" phrase, if present. Zero and values that do
/// not fit are treated as absent.
pub fn parse_last_years(query: &str) -> Option<i64> {
    let caps = last_years_pattern().captures(query)?;
    let n: i64 = caps.get(1)?.as_str().parse().ok()?;
    (n > 0).then_some(n)
}

/// Narrow `dataset` to its most recent `N` years when the query asks for it.
///
/// The window is anchored on the newest year present in `dataset`, not on
/// the calendar. Without a `year` column, or without the phrase, the input
/// is returned unchanged. When no row has a readable year the window is
/// empty.
pub fn apply_last_years(dataset: Dataset, query: &str) -> Dataset {
    if !dataset.has_column("year") {
        return dataset;
    }
    let Some(n) = parse_last_years(query) else {
        return dataset;
    };
    let Some(max_year) = dataset.years().into_iter().max() else {
        log::debug!("last {n} years: no readable year, nothing kept");
        return dataset.select_rows(&[]);
    };
    let min_year = max_year.saturating_sub(n - 1);
    log::debug!("last {n} years: keeping {min_year}..={max_year}");
    dataset.select_rows(&year_at_least_indices(&dataset, min_year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn years(range: std::ops::RangeInclusive<i64>) -> Dataset {
        Dataset::new(
            vec!["Year".into()],
            range.map(|y| vec![CellValue::Integer(y)]).collect(),
        )
    }

    #[test]
    fn parses_count() {
        assert_eq!(parse_last_years("price trend last 3 years"), Some(3));
        assert_eq!(parse_last_years("LAST 10 YEARS please"), Some(10));
        assert_eq!(parse_last_years("last year"), None);
        assert_eq!(parse_last_years("last 0 years"), None);
    }

    #[test]
    fn keeps_most_recent_window() {
        let filtered = apply_last_years(years(2018..=2023), "demand in wakad last 3 years");
        assert_eq!(filtered.years(), vec![2021, 2022, 2023]);
    }

    #[test]
    fn window_larger_than_data_keeps_everything() {
        let filtered = apply_last_years(years(2020..=2022), "last 10 years");
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn no_phrase_no_filter() {
        let filtered = apply_last_years(years(2018..=2023), "price trend");
        assert_eq!(filtered.len(), 6);
    }

    #[test]
    fn rows_without_year_are_dropped_by_window() {
        let mut ds = years(2021..=2022);
        ds.rows.push(crate::data::model::Row {
            values: vec![CellValue::Null],
        });
        let filtered = apply_last_years(ds, "last 1 years");
        assert_eq!(filtered.years(), vec![2022]);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn huge_window_on_negative_years_saturates() {
        let ds = Dataset::new(
            vec!["Year".into()],
            vec![vec![CellValue::Integer(-5)], vec![CellValue::Integer(-3)]],
        );
        let filtered = apply_last_years(ds, "last 9223372036854775807 years");
        assert_eq!(filtered.years(), vec![-5, -3]);
    }

    #[test]
    fn window_without_readable_years_is_empty() {
        let ds = Dataset::new(
            vec!["Year".into(), "Rate".into()],
            vec![
                vec![CellValue::Null, CellValue::Integer(7000)],
                vec![CellValue::Null, CellValue::Integer(7100)],
            ],
        );
        let filtered = apply_last_years(ds, "last 2 years");
        assert!(filtered.is_empty());
        assert_eq!(filtered.columns, vec!["year", "rate"]);
    }
}
