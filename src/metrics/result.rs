//! Metric result record and metric identifiers.

use crate::error::{KpiError, Result};
use serde::Serialize;
use std::fmt;

/// Identifier of a single KPI in a [`MetricResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    TotalActuals,
    TotalPredictions,
    /// Share of predicted volume that fell on periods with zero actuals.
    ZeroActualPredictionShare,
    /// Distinct entities (products, stores, ...) behind the result.
    EntityCount,
    MeanActuals,
    MeanPredictions,
    /// Mean deviation.
    Md,
    Bias,
    /// Relative mean absolute deviation.
    Rmad,
    /// Root mean squared error.
    Rmse,
    /// Mean absolute deviation.
    Mad,
    /// `1 - RMAD`, or 0 when RMAD is undefined.
    Accuracy,
    /// `1 + Bias`.
    NetAccuracy,
    Wmape,
    /// WMAPE restricted to periods with positive actuals.
    WmapePositiveActuals,
    /// Accuracy ignoring the error of periods without a forecast.
    FaNeglectZeroForecast,
    OutlierKpi,
    /// Number of scored (target, prediction) pairs.
    Observations,
}

impl Metric {
    /// Columns of the default KPI table, in display order.
    pub const DEFAULT: [Metric; 10] = [
        Metric::TotalActuals,
        Metric::TotalPredictions,
        Metric::ZeroActualPredictionShare,
        Metric::EntityCount,
        Metric::MeanActuals,
        Metric::MeanPredictions,
        Metric::Md,
        Metric::Bias,
        Metric::Rmad,
        Metric::Rmse,
    ];

    /// Every computable metric: the default schema followed by the extended one.
    pub const ALL: [Metric; 18] = [
        Metric::TotalActuals,
        Metric::TotalPredictions,
        Metric::ZeroActualPredictionShare,
        Metric::EntityCount,
        Metric::MeanActuals,
        Metric::MeanPredictions,
        Metric::Md,
        Metric::Bias,
        Metric::Rmad,
        Metric::Rmse,
        Metric::Mad,
        Metric::Accuracy,
        Metric::NetAccuracy,
        Metric::Wmape,
        Metric::WmapePositiveActuals,
        Metric::FaNeglectZeroForecast,
        Metric::OutlierKpi,
        Metric::Observations,
    ];

    /// Column header used in KPI tables.
    pub fn name(self) -> &'static str {
        match self {
            Metric::TotalActuals => "Total Actuals",
            Metric::TotalPredictions => "Total Predictions",
            Metric::ZeroActualPredictionShare => "% predictions for 0 actuals",
            Metric::EntityCount => "Categories",
            Metric::MeanActuals => "Mean Actuals",
            Metric::MeanPredictions => "Mean Predictions",
            Metric::Md => "MD",
            Metric::Bias => "Bias",
            Metric::Rmad => "RMAD",
            Metric::Rmse => "RMSE",
            Metric::Mad => "MAD",
            Metric::Accuracy => "Accuracy",
            Metric::NetAccuracy => "Net Accuracy",
            Metric::Wmape => "WMAPE",
            Metric::WmapePositiveActuals => "WMAPE (actuals > 0)",
            Metric::FaNeglectZeroForecast => "FA neglecting zero forecasts",
            Metric::OutlierKpi => "Outlier KPI",
            Metric::Observations => "Observations",
        }
    }

    /// Look a metric up by its column header.
    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.name() == name)
    }

    fn undefined_reason(self) -> &'static str {
        match self {
            Metric::ZeroActualPredictionShare => "total predictions are zero",
            Metric::Rmad => "mean actuals are not positive",
            Metric::WmapePositiveActuals => "no period has positive actuals",
            _ => "total actuals are zero",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accuracy KPIs for one forecast over one slice of observations.
///
/// Ratios whose denominator is zero are `None` rather than NaN or infinity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub total_actuals: f64,
    pub total_predictions: f64,
    /// `None` when total predictions are zero.
    pub zero_actual_prediction_share: Option<f64>,
    pub entity_count: usize,
    pub mean_actuals: f64,
    pub mean_predictions: f64,
    pub md: f64,
    pub mad: f64,
    pub rmse: f64,
    /// `None` unless mean actuals are positive.
    pub rmad: Option<f64>,
    pub accuracy: f64,
    /// `None` when total actuals are zero, as are the ratios below.
    pub bias: Option<f64>,
    pub net_accuracy: Option<f64>,
    pub wmape: Option<f64>,
    /// `None` when no period has positive actuals.
    pub wmape_positive_actuals: Option<f64>,
    pub fa_neglect_zero_forecast: Option<f64>,
    pub outlier_kpi: Option<f64>,
    pub observations: usize,
}

impl MetricResult {
    /// Value of a metric, `None` if undefined for this slice.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalActuals => Some(self.total_actuals),
            Metric::TotalPredictions => Some(self.total_predictions),
            Metric::ZeroActualPredictionShare => self.zero_actual_prediction_share,
            Metric::EntityCount => Some(self.entity_count as f64),
            Metric::MeanActuals => Some(self.mean_actuals),
            Metric::MeanPredictions => Some(self.mean_predictions),
            Metric::Md => Some(self.md),
            Metric::Bias => self.bias,
            Metric::Rmad => self.rmad,
            Metric::Rmse => Some(self.rmse),
            Metric::Mad => Some(self.mad),
            Metric::Accuracy => Some(self.accuracy),
            Metric::NetAccuracy => self.net_accuracy,
            Metric::Wmape => self.wmape,
            Metric::WmapePositiveActuals => self.wmape_positive_actuals,
            Metric::FaNeglectZeroForecast => self.fa_neglect_zero_forecast,
            Metric::OutlierKpi => self.outlier_kpi,
            Metric::Observations => Some(self.observations as f64),
        }
    }

    /// Value of a metric, or an [`KpiError::UndefinedMetric`] naming the zero
    /// denominator.
    pub fn require(&self, metric: Metric) -> Result<f64> {
        self.value(metric).ok_or(KpiError::UndefinedMetric {
            metric: metric.name(),
            reason: metric.undefined_reason(),
        })
    }
}

/// Metrics of one forecast variant, tagged with its prediction field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantMetrics {
    pub forecast: String,
    pub metrics: MetricResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_name(metric.name()), Some(metric));
        }
        assert_eq!(Metric::from_name("nope"), None);
    }

    #[test]
    fn default_schema_is_prefix_of_all() {
        assert_eq!(&Metric::ALL[..Metric::DEFAULT.len()], &Metric::DEFAULT);
    }
}
