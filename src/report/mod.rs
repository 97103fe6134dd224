//! Presentation of scored groups: KPI tables, line charts and comparison
//! charts.
//!
//! Nothing here renders pixels. Tables format to text with per-cell colors,
//! charts are serializable values carrying their series, styles and theme.

pub mod charts;
mod series;
pub mod style;
mod table;

pub use charts::{ComparisonBar, KpiComparisonChart, LineChart, SeriesPoint};
pub use series::{
    aggregate_by_period, per_group_period_charts, period_chart, PeriodSeriesConfig,
};
pub use style::{
    forecast_color, NamedColor, SeriesStyle, SeriesStyles, Theme, FORECAST_COLORS,
};
pub use table::{group_thousands, Cell, KpiRow, KpiTable, TableFormat, ValueFormat};
