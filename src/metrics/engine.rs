//! Accuracy KPI computation over (target, prediction) pairs.

use crate::core::ObservationTable;
use crate::error::{KpiError, Result};
use crate::metrics::result::{MetricResult, VariantMetrics};
use tracing::debug;

/// Calculate accuracy KPIs between actual and predicted values.
///
/// Pairs where either value is NaN or infinite are skipped. Returns `Ok(None)`
/// when no pair remains.
///
/// # Arguments
/// * `targets` - Actual observed values
/// * `predictions` - Forecast values, aligned with `targets`
/// * `entity_count` - Number of distinct entities behind the slice, passed through
pub fn compute_from_pairs(
    targets: &[f64],
    predictions: &[f64],
    entity_count: usize,
) -> Result<Option<MetricResult>> {
    if targets.len() != predictions.len() {
        return Err(KpiError::LengthMismatch {
            column: "predictions".to_string(),
            expected: targets.len(),
            got: predictions.len(),
        });
    }

    let pairs: Vec<(f64, f64)> = targets
        .iter()
        .zip(predictions.iter())
        .filter(|(t, p)| t.is_finite() && p.is_finite())
        .map(|(&t, &p)| (t, p))
        .collect();

    Ok(score_pairs(&pairs, entity_count))
}

/// Calculate accuracy KPIs for one prediction column of a table.
///
/// Rows where the target or the prediction is missing, NaN or infinite are
/// dropped first.
pub fn compute_metrics(
    table: &ObservationTable,
    prediction_field: &str,
    target_field: &str,
    entity_count: usize,
) -> Result<Option<MetricResult>> {
    let targets = table.numeric(target_field)?;
    let predictions = table.numeric(prediction_field)?;

    let pairs: Vec<(f64, f64)> = targets
        .iter()
        .zip(predictions.iter())
        .filter_map(|(t, p)| match (t, p) {
            (Some(t), Some(p)) if t.is_finite() && p.is_finite() => Some((*t, *p)),
            _ => None,
        })
        .collect();

    let dropped = table.len() - pairs.len();
    if dropped > 0 {
        debug!(
            prediction_field,
            target_field, dropped, "dropped rows with missing values"
        );
    }

    Ok(score_pairs(&pairs, entity_count))
}

/// Calculate KPIs for several forecasts against the same target.
///
/// Results are returned in the order of `prediction_fields`; a forecast
/// whose rows are all missing produces no entry.
pub fn compute_metrics_multi<S: AsRef<str>>(
    table: &ObservationTable,
    prediction_fields: &[S],
    target_field: &str,
    entity_count: usize,
) -> Result<Vec<VariantMetrics>> {
    if prediction_fields.is_empty() {
        return Err(KpiError::InvalidParameter(
            "at least one prediction field is required".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(prediction_fields.len());
    for field in prediction_fields {
        let field = field.as_ref();
        if let Some(metrics) = compute_metrics(table, field, target_field, entity_count)? {
            results.push(VariantMetrics {
                forecast: field.to_string(),
                metrics,
            });
        }
    }
    Ok(results)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn score_pairs(pairs: &[(f64, f64)], entity_count: usize) -> Option<MetricResult> {
    if pairs.is_empty() {
        return None;
    }

    let n = pairs.len() as f64;
    let mut target_sum = 0.0;
    let mut pred_sum = 0.0;
    let mut d_sum = 0.0;
    let mut ad_sum = 0.0;
    let mut ad_nonzero_fc_sum = 0.0;
    let mut se_sum = 0.0;
    let mut zero_actual_pred_sum = 0.0;
    let mut positive_target_sum = 0.0;
    let mut positive_ad_sum = 0.0;
    let mut outlier_sum = 0.0;

    for &(target, pred) in pairs {
        let d = pred - target;
        let ad = d.abs();

        target_sum += target;
        pred_sum += pred;
        d_sum += d;
        ad_sum += ad;
        se_sum += d * d;

        // A zero forecast means no forecast was issued for the period.
        if pred != 0.0 {
            ad_nonzero_fc_sum += ad;
        }
        if target == 0.0 {
            zero_actual_pred_sum += pred;
        }
        if target > 0.0 {
            positive_target_sum += target;
            positive_ad_sum += ad;
        }
        // Under-forecast by more than the forecast itself.
        if -d > pred {
            outlier_sum += -d - pred;
        }
    }

    let mean_actuals = target_sum / n;
    let mad = ad_sum / n;

    let (rmad, accuracy) = if mean_actuals > 0.0 {
        let rmad = mad / mean_actuals;
        (Some(rmad), 1.0 - rmad)
    } else {
        (None, 0.0)
    };

    let bias = ratio(pred_sum - target_sum, target_sum);

    Some(MetricResult {
        total_actuals: target_sum,
        total_predictions: pred_sum,
        zero_actual_prediction_share: ratio(zero_actual_pred_sum, pred_sum),
        entity_count,
        mean_actuals,
        mean_predictions: pred_sum / n,
        md: d_sum / n,
        mad,
        rmse: (se_sum / n).sqrt(),
        rmad,
        accuracy,
        bias,
        net_accuracy: bias.map(|b| 1.0 + b),
        wmape: ratio(ad_sum, target_sum),
        wmape_positive_actuals: ratio(positive_ad_sum, positive_target_sum),
        fa_neglect_zero_forecast: ratio(ad_nonzero_fc_sum, target_sum).map(|r| 1.0 - r),
        outlier_kpi: ratio(outlier_sum, target_sum),
        observations: pairs.len(),
    })
}
