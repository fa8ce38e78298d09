/// Data layer: measurement types, loading, and margin analysis.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  pick x / y columns → MeasurementSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  margin   │  limits → margins, worst case, PASS / FAIL
///   └──────────┘
///        │
///        ▼
///     MarginReport
/// ```

pub mod loader;
pub mod margin;
pub mod model;
