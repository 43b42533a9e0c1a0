/// Data layer: the calibration engine.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  charge-state m/z windows → matching (row, z)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ calibration │  CCS + log intensity → FeatureTable
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  summary over selected points
///   └──────────┘
/// ```

pub mod calibration;
pub mod filter;
pub mod loader;
pub mod model;
pub mod params;
pub mod stats;
