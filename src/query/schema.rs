//! Column detection rules.
//!
//! Spreadsheets from different sources label the same concept differently,
//! so columns are located by an ordered list of rules. Rules are tried in
//! order; within a rule, the first column (in sheet order) that satisfies
//! it wins.

use serde::{Deserialize, Serialize};

/// One way of recognising a column by its normalised name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnRule {
    /// The column is named exactly `name`.
    Exact { name: String },
    /// The column name contains any of the given substrings.
    Contains { any: Vec<String> },
}

impl ColumnRule {
    pub fn exact(name: &str) -> Self {
        ColumnRule::Exact {
            name: name.to_string(),
        }
    }

    pub fn contains(any: &[&str]) -> Self {
        ColumnRule::Contains {
            any: any.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `"final location"`, else anything mentioning `loc` or `area`.
    pub fn default_location_rules() -> Vec<ColumnRule> {
        vec![
            ColumnRule::exact("final location"),
            ColumnRule::contains(&["loc", "area"]),
        ]
    }

    pub fn matches(&self, column: &str) -> bool {
        match self {
            ColumnRule::Exact { name } => column == name,
            ColumnRule::Contains { any } => any.iter().any(|needle| column.contains(needle.as_str())),
        }
    }
}

/// Return the first column picked by `rules`, trying rules in order.
pub fn detect_column<'a>(rules: &[ColumnRule], columns: &'a [String]) -> Option<&'a str> {
    rules.iter().find_map(|rule| {
        columns
            .iter()
            .find(|c| rule.matches(c))
            .map(String::as_str)
    })
}
