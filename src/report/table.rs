//! Formatted KPI tables.

use crate::aggregate::GroupMetrics;
use crate::metrics::Metric;
use crate::report::style::NamedColor;
use std::fmt;

/// Formatting options for a [`KpiTable`].
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Text before the prediction period in the caption.
    pub caption: String,
    /// Header of the label column.
    pub index_name: String,
    /// Metrics shown, in column order.
    pub metrics: Vec<Metric>,
    /// First and last prediction date shown in the caption.
    pub period: Option<(String, String)>,
    pub negative_color: NamedColor,
    pub positive_color: NamedColor,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            caption: String::new(),
            index_name: "group".to_string(),
            metrics: Metric::DEFAULT.to_vec(),
            period: None,
            negative_color: NamedColor::Orange,
            positive_color: NamedColor::Purple,
        }
    }
}

impl TableFormat {
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_period(mut self, from: impl fmt::Display, to: impl fmt::Display) -> Self {
        self.period = Some((from.to_string(), to.to_string()));
        self
    }

    /// Full caption, including the prediction period when set.
    pub fn full_caption(&self) -> String {
        match &self.period {
            Some((from, to)) => format!("{} | predictions from {} to {}", self.caption, from, to),
            None => self.caption.clone(),
        }
    }
}

/// How a metric is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Percentage with one decimal.
    Percent,
    /// Thousands separators, no decimals.
    Count,
    /// Thousands separators, two decimals.
    Decimal,
}

impl ValueFormat {
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::TotalActuals
            | Metric::TotalPredictions
            | Metric::EntityCount
            | Metric::Observations => ValueFormat::Count,
            Metric::MeanActuals
            | Metric::MeanPredictions
            | Metric::Md
            | Metric::Bias
            | Metric::Rmse
            | Metric::Mad => ValueFormat::Decimal,
            _ => ValueFormat::Percent,
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Percent => format!("{:.1}%", value * 100.0),
            ValueFormat::Count => group_thousands(value, 0),
            ValueFormat::Decimal => group_thousands(value, 2),
        }
    }
}

/// Whether a metric is colored by sign.
fn is_signed(metric: Metric) -> bool {
    matches!(metric, Metric::Md | Metric::Bias)
}

/// Format with a fixed number of decimals and comma thousands separators.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

/// A rendered table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Text color for signed metrics.
    pub color: Option<NamedColor>,
}

/// A rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// KPI table ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTable {
    pub caption: String,
    pub header: Vec<String>,
    pub rows: Vec<KpiRow>,
}

impl KpiTable {
    /// Format scored groups, keeping their order.
    pub fn build(results: &[GroupMetrics], format: &TableFormat) -> Self {
        let mut header = vec![format.index_name.clone()];
        header.extend(format.metrics.iter().map(|m| m.name().to_string()));

        let rows = results
            .iter()
            .map(|r| KpiRow {
                label: r.label.clone(),
                cells: format
                    .metrics
                    .iter()
                    .map(|&metric| match r.metrics.value(metric) {
                        Some(value) => Cell {
                            text: ValueFormat::for_metric(metric).format(value),
                            color: is_signed(metric).then(|| {
                                if value < 0.0 {
                                    format.negative_color
                                } else {
                                    format.positive_color
                                }
                            }),
                        },
                        None => Cell {
                            text: "n/a".to_string(),
                            color: None,
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            caption: format.full_caption(),
            header,
            rows,
        }
    }

    /// CSS declaration for a cell, e.g. `color: #E75424`.
    pub fn cell_style(cell: &Cell) -> Option<String> {
        cell.color.map(|c| format!("color: {}", c.hex()))
    }
}

impl fmt::Display for KpiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            widths[0] = widths[0].max(row.label.chars().count());
            for (i, cell) in row.cells.iter().enumerate() {
                widths[i + 1] = widths[i + 1].max(cell.text.chars().count());
            }
        }

        if !self.caption.is_empty() {
            writeln!(f, "{}", self.caption)?;
        }
        let header: Vec<String> = self
            .header
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (h, &w))| if i == 0 { format!("{:<w$}", h) } else { format!("{:>w$}", h) })
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;

        for row in &self.rows {
            let mut line = format!("{:<w$}", row.label, w = widths[0]);
            for (cell, &w) in row.cells.iter().zip(&widths[1..]) {
                line.push_str("  ");
                line.push_str(&format!("{:>w$}", cell.text));
            }
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
