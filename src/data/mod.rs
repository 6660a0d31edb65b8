/// Data layer: core types, loading, filtering and storage.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet upload
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  versioned immutable snapshot per dataset id
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse snapshot bytes → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  normalised columns, rows of CellValue
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  location / year predicates → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
