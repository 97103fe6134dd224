//! Calendar feature derivation from a timestamp column.

use crate::calendar::fields;
use crate::core::{Column, ObservationTable};
use crate::error::Result;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::Serialize;

/// Calendar features of a single timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarFeatures {
    /// Day of the calendar year, 1-based.
    pub day_of_year: u32,
    /// 0 = Monday ... 6 = Sunday.
    pub weekday: u32,
    pub weekday_name: &'static str,
    /// Timestamp shifted back to the Monday of its week, time of day kept.
    pub week_monday: DateTime<Utc>,
    pub iso_year: i32,
    pub iso_week: u32,
    pub day_of_month: u32,
    pub month: u32,
    /// `day_of_month / 7`, so 0..=4.
    pub week_of_month: u32,
}

impl CalendarFeatures {
    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        let weekday = ts.weekday();
        let offset = weekday.num_days_from_monday();
        let iso = ts.iso_week();
        Self {
            day_of_year: ts.ordinal(),
            weekday: offset,
            weekday_name: weekday_name(weekday),
            week_monday: ts - Duration::days(offset as i64),
            iso_year: iso.year(),
            iso_week: iso.week(),
            day_of_month: ts.day(),
            month: ts.month(),
            week_of_month: ts.day() / 7,
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Whole weeks elapsed from `origin` to `ts`.
pub fn weeks_since(origin: DateTime<Utc>, ts: DateTime<Utc>) -> i64 {
    (ts - origin).num_days() / 7
}

/// Add calendar feature columns derived from `time_field`.
///
/// Adds `ISODAY`, `WEEKDAY`, `WEEKDAY_NAME`, `THIS_WEEK_MONDAY`, `YEAR` (ISO
/// year), `WEEK` (ISO week), `MONTH_DAY`, `MONTH`, `WEEK_OF_MONTH` and
/// `TIMEDELTA`, the number of whole weeks since the earliest timestamp of the
/// table. Existing columns with these names are replaced.
pub fn enrich(table: &ObservationTable, time_field: &str) -> Result<ObservationTable> {
    let timestamps = table.timestamps(time_field)?;
    let features: Vec<CalendarFeatures> = timestamps
        .iter()
        .map(|&ts| CalendarFeatures::from_timestamp(ts))
        .collect();
    let origin = timestamps.iter().min().copied();

    let int_column = |f: fn(&CalendarFeatures) -> i64| {
        Column::Integer(features.iter().map(f).collect())
    };

    let mut enriched = table.clone();
    enriched.set_column(fields::ISO_DAY, int_column(|c| c.day_of_year as i64))?;
    enriched.set_column(fields::WEEKDAY, int_column(|c| c.weekday as i64))?;
    enriched.set_column(
        fields::WEEKDAY_NAME,
        Column::Categorical(features.iter().map(|c| c.weekday_name.to_string()).collect()),
    )?;
    enriched.set_column(
        fields::THIS_WEEK_MONDAY,
        Column::Timestamp(features.iter().map(|c| c.week_monday).collect()),
    )?;
    enriched.set_column(fields::YEAR, int_column(|c| c.iso_year as i64))?;
    enriched.set_column(fields::WEEK, int_column(|c| c.iso_week as i64))?;
    enriched.set_column(fields::MONTH_DAY, int_column(|c| c.day_of_month as i64))?;
    enriched.set_column(fields::MONTH, int_column(|c| c.month as i64))?;
    enriched.set_column(fields::WEEK_OF_MONTH, int_column(|c| c.week_of_month as i64))?;
    enriched.set_column(
        fields::TIMEDELTA,
        Column::Integer(
            timestamps
                .iter()
                .map(|&ts| origin.map(|o| weeks_since(o, ts)).unwrap_or(0))
                .collect(),
        ),
    )?;

    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn features_follow_iso_calendar() {
        // Sunday 2023-01-01 belongs to ISO week 52 of 2022.
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 15, 30, 0).unwrap();
        let f = CalendarFeatures::from_timestamp(ts);

        assert_eq!(f.day_of_year, 1);
        assert_eq!(f.weekday, 6);
        assert_eq!(f.weekday_name, "Sunday");
        assert_eq!(f.iso_year, 2022);
        assert_eq!(f.iso_week, 52);
        assert_eq!(f.week_monday, Utc.with_ymd_and_hms(2022, 12, 26, 15, 30, 0).unwrap());
        assert_eq!(f.day_of_month, 1);
        assert_eq!(f.month, 1);
        assert_eq!(f.week_of_month, 0);
    }

    #[test]
    fn week_of_month_uses_integer_division() {
        let cases = [(6, 0), (7, 1), (13, 1), (14, 2), (28, 4), (31, 4)];
        for (day, expected) in cases {
            let ts = Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap();
            assert_eq!(CalendarFeatures::from_timestamp(ts).week_of_month, expected);
        }
    }

    #[test]
    fn enrich_adds_columns_and_week_index() {
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
        ];
        let table = ObservationTable::builder()
            .timestamp("C_DATE", timestamps)
            .numeric("sales", vec![1.0, 2.0, 3.0, 4.0])
            .build()
            .unwrap();

        let enriched = enrich(&table, "C_DATE").unwrap();

        assert_eq!(enriched.integers(fields::TIMEDELTA).unwrap(), &[2, 0, 0, 1]);
        assert_eq!(enriched.integers(fields::WEEK).unwrap(), &[3, 1, 1, 2]);
        assert_eq!(enriched.integers(fields::YEAR).unwrap(), &[2024; 4]);
        assert_eq!(enriched.integers(fields::WEEKDAY).unwrap(), &[0, 0, 6, 0]);
        assert_eq!(
            enriched.categorical(fields::WEEKDAY_NAME).unwrap()[2],
            "Sunday"
        );
        assert_eq!(
            enriched.timestamps(fields::THIS_WEEK_MONDAY).unwrap()[2],
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(enriched.has_column("sales"));
    }

    #[test]
    fn enrich_is_idempotent() {
        let table = ObservationTable::builder()
            .timestamp("t", vec![Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap()])
            .build()
            .unwrap();
        let once = enrich(&table, "t").unwrap();
        let twice = enrich(&once, "t").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn enrich_requires_timestamp_column() {
        let table = ObservationTable::builder()
            .numeric("t", vec![1.0])
            .build()
            .unwrap();
        assert!(enrich(&table, "t").is_err());
    }
}
