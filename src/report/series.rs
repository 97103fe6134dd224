//! Weekly and daily actual-vs-forecast series with prior-year overlays.

use crate::aggregate::{midnight, rank_groups_by};
use crate::calendar::{attach_prior_year, enrich, fields, PeriodKey};
use crate::core::{KeyValue, ObservationTable, Reduction};
use crate::error::{KpiError, Result};
use crate::report::charts::LineChart;
use crate::report::style::{SeriesStyles, Theme};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Configuration for period-aggregated series.
#[derive(Debug, Clone)]
pub struct PeriodSeriesConfig {
    pub period: PeriodKey,
    /// Timestamp column of the raw observations.
    pub time_field: String,
    pub actuals_field: String,
    /// Forecast (or other) columns plotted next to the actuals.
    pub value_fields: Vec<String>,
    /// Reduction applied per period; `Sum` or `Mean`.
    pub reduction: Reduction,
    /// First period anchor shown, inclusive.
    pub date_from: DateTime<Utc>,
    /// End of the shown range, exclusive.
    pub date_upto: DateTime<Utc>,
    pub last_year: bool,
    pub two_years_ago: bool,
}

impl PeriodSeriesConfig {
    fn new<S: Into<String>>(
        period: PeriodKey,
        actuals_field: impl Into<String>,
        value_fields: Vec<S>,
    ) -> Self {
        Self {
            period,
            time_field: "C_DATE".to_string(),
            actuals_field: actuals_field.into(),
            value_fields: value_fields.into_iter().map(Into::into).collect(),
            reduction: Reduction::Sum,
            date_from: DateTime::<Utc>::MIN_UTC,
            date_upto: DateTime::<Utc>::MAX_UTC,
            last_year: true,
            two_years_ago: true,
        }
    }

    /// Series aggregated per ISO week, anchored on the week's Monday.
    pub fn weekly<S: Into<String>>(actuals_field: impl Into<String>, value_fields: Vec<S>) -> Self {
        Self::new(PeriodKey::Week, actuals_field, value_fields)
    }

    /// Series aggregated per day of year, anchored on the first timestamp.
    pub fn daily<S: Into<String>>(actuals_field: impl Into<String>, value_fields: Vec<S>) -> Self {
        Self::new(PeriodKey::IsoDay, actuals_field, value_fields)
    }

    pub fn with_time_field(mut self, time_field: impl Into<String>) -> Self {
        self.time_field = time_field.into();
        self
    }

    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Show periods anchored in `[from, upto)`, both at midnight.
    pub fn with_dates(mut self, from: NaiveDate, upto: NaiveDate) -> Self {
        self.date_from = midnight(from);
        self.date_upto = midnight(upto);
        self
    }

    pub fn with_prior_years(mut self, last_year: bool, two_years_ago: bool) -> Self {
        self.last_year = last_year;
        self.two_years_ago = two_years_ago;
        self
    }

    /// Column holding the timestamp each aggregated period is plotted at.
    pub fn anchor_field(&self) -> &str {
        match self.period {
            PeriodKey::Week => fields::THIS_WEEK_MONDAY,
            PeriodKey::IsoDay => self.time_field.as_str(),
        }
    }

    fn period_label(&self) -> &'static str {
        match self.period {
            PeriodKey::Week => "weekly",
            PeriodKey::IsoDay => "daily",
        }
    }

    fn reduction_label(&self) -> &'static str {
        match self.reduction {
            Reduction::Sum => "sum",
            Reduction::Mean => "mean",
            Reduction::First => "first",
        }
    }

    fn validate(&self) -> Result<()> {
        if self.reduction == Reduction::First {
            return Err(KpiError::InvalidParameter(
                "period series support only sum or mean".to_string(),
            ));
        }
        Ok(())
    }
}

/// Aggregate observations per period and attach prior-year actuals.
///
/// Output columns: the period column, `YEAR`, the reduced value and actuals
/// fields, the anchor timestamp, then `<actuals>_last_year` and
/// `<actuals>_-2_years`. Rows are ordered by (period, year).
pub fn aggregate_by_period(
    table: &ObservationTable,
    config: &PeriodSeriesConfig,
) -> Result<ObservationTable> {
    config.validate()?;
    if table.is_empty() {
        return Err(KpiError::EmptyData);
    }
    let enriched = enrich(table, &config.time_field)?;

    let mut reductions: Vec<(&str, Reduction)> = config
        .value_fields
        .iter()
        .map(|f| (f.as_str(), config.reduction))
        .collect();
    reductions.push((config.actuals_field.as_str(), config.reduction));
    reductions.push((config.anchor_field(), Reduction::First));

    let aggregated =
        enriched.group_reduce(&[config.period.field(), fields::YEAR], &reductions)?;
    let aggregated = attach_prior_year(&aggregated, &config.actuals_field, 1, config.period)?;
    attach_prior_year(&aggregated, &config.actuals_field, 2, config.period)
}

/// Line chart of actuals, prior-year overlays and value fields per period.
///
/// Only periods anchored in `[date_from, date_upto)` are shown, in
/// chronological order.
pub fn period_chart(
    table: &ObservationTable,
    config: &PeriodSeriesConfig,
    title: impl Into<String>,
    theme: &Theme,
) -> Result<LineChart> {
    let aggregated = aggregate_by_period(table, config)?;
    let anchor = config.anchor_field();
    let anchors = aggregated.timestamps(anchor)?;

    let mut rows: Vec<usize> = (0..aggregated.len())
        .filter(|&i| config.date_from <= anchors[i] && anchors[i] < config.date_upto)
        .collect();
    rows.sort_by_key(|&i| anchors[i]);
    let shown = aggregated.gather(&rows);

    let styles = SeriesStyles::for_series(
        &config.value_fields,
        &config.actuals_field,
        config.last_year,
        config.two_years_ago,
    );
    LineChart::from_table(&shown, anchor, &styles, title, theme)
}

/// One period chart per top group of `agg_field`.
///
/// Groups are ranked by the configured reduction of the actuals; at most
/// `limit` are charted. Groups without observations after `date_from` are
/// skipped.
pub fn per_group_period_charts(
    table: &ObservationTable,
    config: &PeriodSeriesConfig,
    agg_field: &str,
    limit: usize,
    title_text: &str,
    theme: &Theme,
) -> Result<Vec<(KeyValue, LineChart)>> {
    config.validate()?;
    let ranked = rank_groups_by(
        table,
        agg_field,
        &config.actuals_field,
        limit,
        config.reduction,
    )?;
    let timestamps = table.timestamps(&config.time_field)?;
    let mut group_rows: HashMap<KeyValue, Vec<usize>> = HashMap::new();
    for (row, key) in table.keys(agg_field)?.into_iter().enumerate() {
        group_rows.entry(key).or_default().push(row);
    }

    let mut charts = Vec::with_capacity(ranked.len());
    for (group, _) in ranked {
        let rows = group_rows.remove(&group).unwrap_or_default();
        if !rows.iter().any(|&i| timestamps[i] > config.date_from) {
            debug!(group = %group, "no observations after date_from, skipping chart");
            continue;
        }

        let title = format!(
            "{} {} {} {}",
            group,
            config.period_label(),
            config.reduction_label(),
            title_text
        );
        let chart = period_chart(&table.gather(&rows), config, title.trim_end(), theme)?;
        charts.push((group, chart));
    }
    Ok(charts)
}
