//! Configuration for grouped KPI scoring.

use crate::error::{KpiError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Inclusive time window `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(KpiError::InvalidParameter(
                "window start must be <= window end".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    /// Window from midnight of `from` to midnight of `to`, both included.
    pub fn between_dates(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        Self::new(midnight(from), midnight(to))
    }

    /// Window accepting every timestamp.
    pub fn unbounded() -> Self {
        Self {
            from: DateTime::<Utc>::MIN_UTC,
            to: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts <= self.to
    }
}

pub(crate) fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Configuration for [`aggregate_and_score`](crate::aggregate::aggregate_and_score).
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Categorical column defining the groups.
    pub group_key: String,
    /// Timestamp column filtered by `window`.
    pub time_field: String,
    pub window: TimeWindow,
    /// Column with actuals.
    pub target_field: String,
    /// Forecast columns, scored in this order.
    pub prediction_fields: Vec<String>,
    /// Extra numeric columns summed during reduction.
    pub reduce_fields: Vec<String>,
    /// Column whose distinct values are counted per group.
    pub entity_id_field: Option<String>,
    /// Maximum number of groups scored.
    pub limit: usize,
    /// Columns each group is summed to before scoring; empty scores raw rows.
    pub granularity_keys: Vec<String>,
}

impl AggregationConfig {
    /// Score `prediction_field` against `target_field` per value of `group_key`.
    pub fn new(
        group_key: impl Into<String>,
        target_field: impl Into<String>,
        prediction_field: impl Into<String>,
    ) -> Self {
        Self {
            group_key: group_key.into(),
            time_field: "C_DATE".to_string(),
            window: TimeWindow::unbounded(),
            target_field: target_field.into(),
            prediction_fields: vec![prediction_field.into()],
            reduce_fields: Vec::new(),
            entity_id_field: None,
            limit: 100,
            granularity_keys: Vec::new(),
        }
    }

    /// Add a forecast to compare against the first one.
    pub fn with_comparison(mut self, prediction_field: impl Into<String>) -> Self {
        self.prediction_fields.push(prediction_field.into());
        self
    }

    pub fn with_time_field(mut self, time_field: impl Into<String>) -> Self {
        self.time_field = time_field.into();
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_entity_field(mut self, field: impl Into<String>) -> Self {
        self.entity_id_field = Some(field.into());
        self
    }

    pub fn with_granularity<S: Into<String>>(mut self, keys: Vec<S>) -> Self {
        self.granularity_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reduce_fields<S: Into<String>>(mut self, fields: Vec<S>) -> Self {
        self.reduce_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Numeric columns summed per granularity combination, without repeats.
    pub fn summed_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        let all = std::iter::once(&self.target_field)
            .chain(&self.prediction_fields)
            .chain(&self.reduce_fields);
        for field in all {
            if !fields.contains(&field.as_str()) {
                fields.push(field);
            }
        }
        fields
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.prediction_fields.is_empty() {
            return Err(KpiError::InvalidParameter(
                "at least one prediction field is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_inclusive() {
        let from = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();
        let window = TimeWindow::between_dates(from, to).unwrap();

        assert!(window.contains(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()));
        assert!(window.contains(Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 1).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2021, 12, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn reversed_window_is_rejected() {
        let from = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert!(TimeWindow::between_dates(from, to).is_err());
    }

    #[test]
    fn summed_fields_are_deduplicated() {
        let config = AggregationConfig::new("region", "sales", "fc1")
            .with_comparison("fc2")
            .with_reduce_fields(vec!["fc1", "returns"]);
        assert_eq!(config.summed_fields(), vec!["sales", "fc1", "fc2", "returns"]);
        assert_eq!(config.limit, 100);
        assert!(config.validate().is_ok());
    }
}
