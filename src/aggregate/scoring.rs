//! Rank groups by volume, reduce each group and score it.

use crate::aggregate::config::AggregationConfig;
use crate::core::{KeyValue, ObservationTable, Reduction};
use crate::error::Result;
use crate::metrics::{compute_metrics, compute_metrics_multi, MetricResult};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// KPIs of one forecast for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetrics {
    /// Value of the group key.
    pub group: KeyValue,
    /// Prediction field the metrics belong to.
    pub forecast: String,
    /// Row label: the group, prefixed by the forecast when several are compared.
    pub label: String,
    pub metrics: MetricResult,
}

/// Rank the distinct values of `group_key` by the sum of `value_field`.
///
/// Sorted descending; groups with equal sums keep their first-encounter order.
/// At most `limit` groups are returned.
pub fn rank_groups(
    table: &ObservationTable,
    group_key: &str,
    value_field: &str,
    limit: usize,
) -> Result<Vec<(KeyValue, f64)>> {
    rank_groups_by(table, group_key, value_field, limit, Reduction::Sum)
}

/// Like [`rank_groups`], ranking by an arbitrary reduction of `value_field`.
///
/// Groups whose reduced value is missing rank last.
pub fn rank_groups_by(
    table: &ObservationTable,
    group_key: &str,
    value_field: &str,
    limit: usize,
    reduction: Reduction,
) -> Result<Vec<(KeyValue, f64)>> {
    let keys = table.keys(group_key)?;
    let values = table.numeric(value_field)?;

    // (key, sum, count, first present value)
    let mut totals: Vec<(KeyValue, f64, usize, Option<f64>)> = Vec::new();
    let mut positions: HashMap<KeyValue, usize> = HashMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        let pos = *positions.entry(key.clone()).or_insert_with(|| {
            totals.push((key, 0.0, 0, None));
            totals.len() - 1
        });
        if let Some(v) = *value {
            let entry = &mut totals[pos];
            entry.1 += v;
            entry.2 += 1;
            entry.3.get_or_insert(v);
        }
    }

    let mut ranked: Vec<(KeyValue, f64)> = totals
        .into_iter()
        .map(|(key, sum, count, first)| {
            let value = match reduction {
                Reduction::Sum => sum,
                Reduction::Mean if count > 0 => sum / count as f64,
                Reduction::First => first.unwrap_or(f64::NEG_INFINITY),
                Reduction::Mean => f64::NEG_INFINITY,
            };
            (key, value)
        })
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    Ok(ranked)
}

/// Score every forecast per group of `config.group_key`.
///
/// Rows are filtered to the configured window, the `limit` largest groups by
/// summed target are kept, and each group is summed to `granularity_keys`
/// before scoring. Groups without any scorable row are omitted. The result is
/// ordered by total actuals, descending.
pub fn aggregate_and_score(
    table: &ObservationTable,
    config: &AggregationConfig,
) -> Result<Vec<GroupMetrics>> {
    config.validate()?;
    table.key_column(&config.group_key)?;
    table.numeric(&config.target_field)?;
    for field in config.prediction_fields.iter().chain(&config.reduce_fields) {
        table.numeric(field)?;
    }

    let timestamps = table.timestamps(&config.time_field)?;
    let windowed = table.filter(|i| config.window.contains(timestamps[i]));
    debug!(
        rows = table.len(),
        in_window = windowed.len(),
        "filtered observations to window"
    );

    let ranked = rank_groups(
        &windowed,
        &config.group_key,
        &config.target_field,
        config.limit,
    )?;
    let mut group_rows: HashMap<KeyValue, Vec<usize>> = HashMap::new();
    for (row, key) in windowed.keys(&config.group_key)?.into_iter().enumerate() {
        group_rows.entry(key).or_default().push(row);
    }

    let slice_of = |group: &KeyValue| match group_rows.get(group) {
        Some(rows) => windowed.gather(rows),
        None => windowed.gather(&[]),
    };

    #[cfg(feature = "parallel")]
    let scored: Vec<Vec<GroupMetrics>> = ranked
        .par_iter()
        .map(|(group, _)| score_group(&slice_of(group), group, config))
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let scored: Vec<Vec<GroupMetrics>> = ranked
        .iter()
        .map(|(group, _)| score_group(&slice_of(group), group, config))
        .collect::<Result<_>>()?;

    let mut results: Vec<GroupMetrics> = scored.into_iter().flatten().collect();
    results.sort_by(|a, b| b.metrics.total_actuals.total_cmp(&a.metrics.total_actuals));
    Ok(results)
}

fn score_group(
    slice: &ObservationTable,
    group: &KeyValue,
    config: &AggregationConfig,
) -> Result<Vec<GroupMetrics>> {
    let entity_count = match &config.entity_id_field {
        Some(field) => slice.distinct(field)?.len(),
        None => 0,
    };

    let reduced = if config.granularity_keys.is_empty() {
        slice.clone()
    } else {
        let keys: Vec<&str> = config.granularity_keys.iter().map(String::as_str).collect();
        let fields: Vec<(&str, Reduction)> = config
            .summed_fields()
            .into_iter()
            .map(|f| (f, Reduction::Sum))
            .collect();
        slice.group_reduce(&keys, &fields)?
    };

    debug!(
        group = %group,
        rows = slice.len(),
        reduced_rows = reduced.len(),
        entity_count,
        "scoring group"
    );

    if reduced.is_empty() {
        return Ok(Vec::new());
    }

    if let [field] = config.prediction_fields.as_slice() {
        let metrics = compute_metrics(&reduced, field, &config.target_field, entity_count)?;
        return Ok(metrics
            .map(|metrics| GroupMetrics {
                group: group.clone(),
                forecast: field.clone(),
                label: group.to_string(),
                metrics,
            })
            .into_iter()
            .collect());
    }

    let variants = compute_metrics_multi(
        &reduced,
        &config.prediction_fields,
        &config.target_field,
        entity_count,
    )?;
    Ok(variants
        .into_iter()
        .map(|v| GroupMetrics {
            group: group.clone(),
            label: format!("{} {}", v.forecast, group),
            forecast: v.forecast,
            metrics: v.metrics,
        })
        .collect())
}
