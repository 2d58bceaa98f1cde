/// Data layer: table types, loading, saving, and label visibility.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (dtype per column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Column>, label column categorical
///   └──────────┘
///        │
///        ├──▶ filter   hidden labels / missing coords → plotted rows
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Table → .parquet / .json / .csv
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
