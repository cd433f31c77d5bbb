//! Cascading filters and aggregation behind the SIGAP KUMUH slum-upgrading
//! dashboard.
//!
//! Rows of CAP/CIP activities are narrowed by a [`FilterState`] over the
//! region → district → sub-district → RW hierarchy, the dropdown options are
//! derived from an [`OptionCatalogue`], and the filtered rows are grouped into
//! chart series and a paginated detail table. Everything here is synchronous
//! and pure apart from the loaders.
pub mod aggregate;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod options;
pub mod output;
pub mod projection;
pub mod summary;
pub mod table;
pub mod types;
pub mod util;

pub use aggregate::{
    chart_dimension, chart_for, chart_query_string, filter_rows, group_aggregated,
    group_for_chart, row_matches, ValueField,
};
pub use catalogue::OptionCatalogue;
pub use config::{AccessLevel, DashboardConfig};
pub use error::{ConfigError, EngineError, LoadError, ProjectionError};
pub use filter::FilterState;
pub use options::{
    district_options, district_options_by_sections, options_for, rw_unit_options,
    sections_for, sub_district_options, OptionSection,
};
pub use table::{
    group_for_table, paginate, search_rows, table_page, ActivityPriority, Page, PageRequest,
    CANONICAL_ACTIVITY_TYPES,
};
pub use types::{
    AggregationResult, BudgetSlice, ChartBarRow, Facet, FilterKey, GroupedRow, HierarchyLevel,
    Program, Row, SummaryStats,
};
