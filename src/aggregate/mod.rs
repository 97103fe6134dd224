//! Grouped KPI scoring over time windows.

mod config;
mod scoring;

pub use config::{AggregationConfig, TimeWindow};
pub(crate) use config::midnight;
pub use scoring::{aggregate_and_score, rank_groups, rank_groups_by, GroupMetrics};
