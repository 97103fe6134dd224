//! Forecast accuracy KPIs.
//!
//! The engine turns aligned (target, prediction) pairs into a [`MetricResult`]:
//! totals and means, mean deviation, bias, RMAD, RMSE and the extended ratios
//! (WMAPE in two flavours, accuracy neglecting zero forecasts, outlier KPI).
//! Ratios with a zero denominator are reported as `None`.

mod engine;
mod result;

pub use engine::{compute_from_pairs, compute_metrics, compute_metrics_multi};
pub use result::{Metric, MetricResult, VariantMetrics};
