/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → FundingTable (dates + amounts coerced)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  session  │  load once, share Arc<FundingTable>, empty on failure
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  industry / city / year predicates → row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, grouped sums / counts, rankings
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod session;
