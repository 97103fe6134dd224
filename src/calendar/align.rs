//! Year-over-year alignment of actuals on a period key.

use crate::calendar::fields;
use crate::core::{Column, ObservationTable};
use crate::error::{KpiError, Result};
use std::collections::{HashMap, HashSet};

/// Period within a year used to align a year with an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodKey {
    /// (ISO year, ISO week).
    #[default]
    Week,
    /// (ISO year, day of year).
    IsoDay,
}

impl PeriodKey {
    /// Column holding the within-year period value.
    pub fn field(self) -> &'static str {
        match self {
            PeriodKey::Week => fields::WEEK,
            PeriodKey::IsoDay => fields::ISO_DAY,
        }
    }
}

/// Name of the column holding actuals from `periods_back` years earlier.
///
/// `sales` becomes `sales_last_year` for one year back and `sales_-2_years`
/// for two.
pub fn prior_year_field(actuals_field: &str, periods_back: u32) -> String {
    match periods_back {
        1 => format!("{}_last_year", actuals_field),
        n => format!("{}_-{}_years", actuals_field, n),
    }
}

fn check_periods_back(periods_back: u32) -> Result<()> {
    if periods_back == 0 {
        return Err(KpiError::InvalidParameter(
            "periods_back must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Row indices grouped by `(year, period)`.
fn index_by_period(years: &[i64], periods: &[i64]) -> HashMap<(i64, i64), Vec<usize>> {
    let mut index: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (row, (&year, &period)) in years.iter().zip(periods).enumerate() {
        index.entry((year, period)).or_default().push(row);
    }
    index
}

/// Pair every row of year `Y` with the actuals of the same period in year
/// `Y - periods_back`.
///
/// The table must carry integer `YEAR` and period columns (see
/// [`enrich`](crate::calendar::enrich)). The join is inner: rows without a
/// counterpart are not part of the output. Output columns are `YEAR`, the
/// period column, `actuals_field` and [`prior_year_field`].
pub fn align_prior_year(
    table: &ObservationTable,
    actuals_field: &str,
    periods_back: u32,
    period: PeriodKey,
) -> Result<ObservationTable> {
    check_periods_back(periods_back)?;
    let years = table.integers(fields::YEAR)?;
    let periods = table.integers(period.field())?;
    let actuals = table.numeric(actuals_field)?;
    let index = index_by_period(years, periods);

    let mut seen = HashSet::new();
    let distinct_years: Vec<i64> = years.iter().copied().filter(|y| seen.insert(*y)).collect();

    let mut left = Vec::new();
    let mut prior = Vec::new();
    for year in distinct_years {
        for row in (0..table.len()).filter(|&i| years[i] == year) {
            let key = (year - periods_back as i64, periods[row]);
            if let Some(matches) = index.get(&key) {
                for &m in matches {
                    left.push(row);
                    prior.push(actuals[m]);
                }
            }
        }
    }

    ObservationTable::builder()
        .integer(fields::YEAR, left.iter().map(|&i| years[i]).collect())
        .integer(period.field(), left.iter().map(|&i| periods[i]).collect())
        .nullable(actuals_field, left.iter().map(|&i| actuals[i]).collect())
        .nullable(prior_year_field(actuals_field, periods_back), prior)
        .build()
}

/// Attach prior-year actuals to every row of `table`.
///
/// Each row keeps its position and gains the actuals of the same period
/// `periods_back` years earlier, summed when that period spans several rows.
/// Rows without a prior-year counterpart get a missing value.
pub fn attach_prior_year(
    table: &ObservationTable,
    actuals_field: &str,
    periods_back: u32,
    period: PeriodKey,
) -> Result<ObservationTable> {
    check_periods_back(periods_back)?;
    let years = table.integers(fields::YEAR)?;
    let periods = table.integers(period.field())?;
    let actuals = table.numeric(actuals_field)?;
    let index = index_by_period(years, periods);

    let values: Vec<Option<f64>> = (0..table.len())
        .map(|row| {
            let key = (years[row] - periods_back as i64, periods[row]);
            index.get(&key).and_then(|matches| {
                matches
                    .iter()
                    .filter_map(|&m| actuals[m])
                    .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
            })
        })
        .collect();

    let mut merged = table.clone();
    merged.set_column(
        prior_year_field(actuals_field, periods_back),
        Column::Numeric(values),
    )?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(years: Vec<i64>, weeks: Vec<i64>, sales: Vec<f64>) -> ObservationTable {
        ObservationTable::builder()
            .integer(fields::YEAR, years)
            .integer(fields::WEEK, weeks)
            .numeric("sales", sales)
            .build()
            .unwrap()
    }

    #[test]
    fn field_names_follow_convention() {
        assert_eq!(prior_year_field("sales", 1), "sales_last_year");
        assert_eq!(prior_year_field("sales", 2), "sales_-2_years");
        assert_eq!(prior_year_field("sales", 3), "sales_-3_years");
    }

    #[test]
    fn align_is_an_inner_join_on_period() {
        let table = weekly(
            vec![2022, 2022, 2023, 2023, 2023],
            vec![1, 2, 1, 2, 3],
            vec![10.0, 20.0, 11.0, 21.0, 31.0],
        );

        let aligned = align_prior_year(&table, "sales", 1, PeriodKey::Week).unwrap();

        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.integers(fields::YEAR).unwrap(), &[2023, 2023]);
        assert_eq!(aligned.integers(fields::WEEK).unwrap(), &[1, 2]);
        assert_eq!(aligned.numeric("sales").unwrap(), &[Some(11.0), Some(21.0)]);
        assert_eq!(
            aligned.numeric("sales_last_year").unwrap(),
            &[Some(10.0), Some(20.0)]
        );
    }

    #[test]
    fn attach_keeps_unmatched_rows_with_missing_values() {
        let table = weekly(
            vec![2021, 2022, 2023, 2023],
            vec![5, 5, 5, 6],
            vec![1.0, 2.0, 3.0, 4.0],
        );

        let merged = attach_prior_year(&table, "sales", 1, PeriodKey::Week).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(
            merged.numeric("sales_last_year").unwrap(),
            &[None, Some(1.0), Some(2.0), None]
        );

        let merged = attach_prior_year(&merged, "sales", 2, PeriodKey::Week).unwrap();
        assert_eq!(
            merged.numeric("sales_-2_years").unwrap(),
            &[None, None, Some(1.0), None]
        );
        assert!(merged.has_column("sales_last_year"));
    }

    #[test]
    fn attach_keeps_row_count_with_repeated_periods() {
        let table = weekly(vec![2022, 2023, 2023], vec![1, 1, 1], vec![5.0, 1.0, 2.0]);

        let merged = attach_prior_year(&table, "sales", 1, PeriodKey::Week).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged.numeric("sales").unwrap(),
            &[Some(5.0), Some(1.0), Some(2.0)]
        );
        assert_eq!(
            merged.numeric("sales_last_year").unwrap(),
            &[None, Some(5.0), Some(5.0)]
        );

        // several prior-year rows of one period are summed
        let table = weekly(vec![2022, 2022, 2023], vec![1, 1, 1], vec![5.0, 4.0, 2.0]);
        let merged = attach_prior_year(&table, "sales", 1, PeriodKey::Week).unwrap();
        assert_eq!(
            merged.numeric("sales_last_year").unwrap(),
            &[None, None, Some(9.0)]
        );
    }

    #[test]
    fn daily_alignment_uses_day_of_year() {
        let table = ObservationTable::builder()
            .integer(fields::YEAR, vec![2023, 2024, 2024])
            .integer(fields::ISO_DAY, vec![100, 100, 101])
            .numeric("sales", vec![7.0, 8.0, 9.0])
            .build()
            .unwrap();

        let merged = attach_prior_year(&table, "sales", 1, PeriodKey::IsoDay).unwrap();
        assert_eq!(
            merged.numeric("sales_last_year").unwrap(),
            &[None, Some(7.0), None]
        );
    }

    #[test]
    fn zero_periods_back_is_rejected() {
        let table = weekly(vec![2024], vec![1], vec![1.0]);
        assert!(matches!(
            align_prior_year(&table, "sales", 0, PeriodKey::Week),
            Err(KpiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn missing_calendar_columns_are_reported() {
        let table = ObservationTable::builder()
            .numeric("sales", vec![1.0])
            .build()
            .unwrap();
        assert!(matches!(
            align_prior_year(&table, "sales", 1, PeriodKey::Week),
            Err(KpiError::ColumnNotFound(_))
        ));
    }
}
