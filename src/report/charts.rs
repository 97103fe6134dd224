//! Chart data for line and bar charts.
//!
//! Charts are plain serializable values: long-format points plus the series
//! domain, color and dash ranges, and the theme. Rendering is left to the
//! plotting frontend.

use crate::aggregate::GroupMetrics;
use crate::core::{KeyValue, ObservationTable};
use crate::error::{KpiError, Result};
use crate::metrics::Metric;
use crate::report::style::{forecast_color, SeriesStyles, Theme};
use serde::Serialize;
use serde_json::Value;

/// One value of one series at one x position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: KeyValue,
    pub variable: String,
    pub value: Option<f64>,
}

/// Line chart of several series over a shared x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_field: String,
    pub y_label: String,
    pub domain: Vec<String>,
    pub colors: Vec<String>,
    pub dashes: Vec<Vec<u32>>,
    pub points: Vec<SeriesPoint>,
    pub theme: Theme,
}

impl LineChart {
    /// Melt the styled series of `table` into long format along `x_field`.
    ///
    /// Every series in `styles` must be a numeric column of `table`.
    pub fn from_table(
        table: &ObservationTable,
        x_field: &str,
        styles: &SeriesStyles,
        title: impl Into<String>,
        theme: &Theme,
    ) -> Result<Self> {
        let x = table.keys(x_field)?;
        let mut series: Vec<(&str, &[Option<f64>])> = Vec::with_capacity(styles.len());
        for style in styles.iter() {
            series.push((style.name.as_str(), table.numeric(&style.name)?));
        }

        let mut points = Vec::with_capacity(x.len() * series.len());
        for (name, values) in &series {
            for (row, x_value) in x.iter().enumerate() {
                points.push(SeriesPoint {
                    x: x_value.clone(),
                    variable: name.to_string(),
                    value: values[row],
                });
            }
        }

        Ok(Self {
            title: title.into(),
            x_field: x_field.to_string(),
            y_label: "QTY".to_string(),
            domain: styles.domain(),
            colors: styles.colors(),
            dashes: styles.dashes(),
            points,
            theme: theme.clone(),
        })
    }

    /// Values of one series, in x order of the source table.
    pub fn series(&self, name: &str) -> Vec<Option<f64>> {
        self.points
            .iter()
            .filter(|p| p.variable == name)
            .map(|p| p.value)
            .collect()
    }

    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| KpiError::Serialization(e.to_string()))
    }
}

/// One bar of a KPI comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBar {
    pub category: String,
    pub forecast: String,
    pub value: Option<f64>,
}

/// Bar chart comparing one metric across forecasts, faceted by group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiComparisonChart {
    pub metric: Metric,
    pub metric_label: String,
    pub forecasts: Vec<String>,
    pub colors: Vec<String>,
    pub bars: Vec<ComparisonBar>,
    pub theme: Theme,
}

impl KpiComparisonChart {
    /// Collect `metric` for every scored (group, forecast) pair.
    ///
    /// Forecasts are ordered by first appearance and colored in
    /// [`FORECAST_COLORS`](crate::report::style::FORECAST_COLORS) order.
    pub fn from_results(
        results: &[GroupMetrics],
        metric: Metric,
        metric_label: impl Into<String>,
        theme: &Theme,
    ) -> Self {
        let mut forecasts: Vec<String> = Vec::new();
        for r in results {
            if !forecasts.contains(&r.forecast) {
                forecasts.push(r.forecast.clone());
            }
        }

        Self {
            metric,
            metric_label: metric_label.into(),
            colors: (0..forecasts.len())
                .map(|i| forecast_color(i).hex().to_string())
                .collect(),
            forecasts,
            bars: results
                .iter()
                .map(|r| ComparisonBar {
                    category: r.group.to_string(),
                    forecast: r.forecast.clone(),
                    value: r.metrics.value(metric),
                })
                .collect(),
            theme: theme.clone(),
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| KpiError::Serialization(e.to_string()))
    }
}
