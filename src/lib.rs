//! # forecast-kpi
//!
//! Forecast accuracy KPIs for retail-style observation tables.
//!
//! Observations (one row per entity and date, with actuals and one or more
//! forecast columns) are loaded into an [`ObservationTable`](core::ObservationTable),
//! optionally enriched with calendar fields, sliced by a group dimension and a
//! time window, reduced to a chosen granularity and scored: totals, mean
//! deviation, bias, RMAD, RMSE, WMAPE and more. Results feed formatted KPI
//! tables and chart data with prior-year overlays.

pub mod aggregate;
pub mod calendar;
pub mod core;
pub mod error;
pub mod metrics;
pub mod report;

pub use error::{KpiError, Result};

pub mod prelude {
    pub use crate::aggregate::{
        aggregate_and_score, rank_groups, AggregationConfig, GroupMetrics, TimeWindow,
    };
    pub use crate::calendar::{attach_prior_year, enrich, PeriodKey};
    pub use crate::core::{Column, KeyValue, ObservationTable, Reduction};
    pub use crate::error::{KpiError, Result};
    pub use crate::metrics::{compute_metrics, compute_metrics_multi, Metric, MetricResult};
    pub use crate::report::{KpiTable, LineChart, PeriodSeriesConfig, TableFormat, Theme};
}
