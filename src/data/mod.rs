/// Data layer: core types, parsing, and summary statistics.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json bytes + filename
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  dispatch on filename → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  ordered typed columns, equal length
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  summary  │  per-column dtype / count / quartiles
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod summary;
