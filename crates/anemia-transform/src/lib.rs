//! Filtering, aggregation, and chart data derivation over loaded survey data.
//!
//! Everything here is pure: functions take a [`anemia_model::Dataset`] and
//! return new values without touching the input.

pub mod aggregate;
pub mod chart_data;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod levels;
pub mod stats;

pub use aggregate::{
    GroupProportions, OutcomeShare, ProportionTable, grouped_proportions, top_n, value_counts,
};
pub use chart_data::{
    Axis, AxisScale, CategoricalData, ChartData, ChartPanel, DistributionData,
    DistributionGroup, HistogramData, PanelBody, RegionData, RegionSummary, SINGLE_SERIES,
    ScatterData, ScatterPoint, Series, build_chart,
};
pub use dashboard::{Dashboard, FilterChoices, build_dashboard};
pub use error::{Result, TransformError};
pub use filter::{
    distinct_tuples, filter, filter_indices, observed_domain, resolve_column,
    selection_for_tuple, validate_selection,
};
pub use levels::order_levels;
pub use stats::{BoxStats, KDE_POINTS, KernelDensity, bin_counts, bin_edges, quantile};
