/// Data layer: histogram / curve types and results-file I/O.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ResultsFile
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ ResultsFile  │  name → Histogram | Curve
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  ResultsFile → .parquet (sample generation)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;
