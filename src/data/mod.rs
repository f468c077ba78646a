/// Data layer: core types, loading, and row previews.
///
/// Architecture:
/// ```text
///  remote URL / local file / upload
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  resolve bytes, default fallback chain, memo cache
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV / JSON / Parquet → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   Table   │  equal-length typed columns (read-only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  preview  │  head / tail / random rows
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod preview;
pub mod source;
