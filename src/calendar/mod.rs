//! Calendar enrichment and year-over-year alignment.

mod align;
mod enrich;

pub use align::{align_prior_year, attach_prior_year, prior_year_field, PeriodKey};
pub use enrich::{enrich, weeks_since, CalendarFeatures};

/// Names of the columns added by [`enrich`].
pub mod fields {
    pub const ISO_DAY: &str = "ISODAY";
    pub const WEEKDAY: &str = "WEEKDAY";
    pub const WEEKDAY_NAME: &str = "WEEKDAY_NAME";
    pub const THIS_WEEK_MONDAY: &str = "THIS_WEEK_MONDAY";
    pub const YEAR: &str = "YEAR";
    pub const WEEK: &str = "WEEK";
    pub const MONTH_DAY: &str = "MONTH_DAY";
    pub const MONTH: &str = "MONTH";
    pub const WEEK_OF_MONTH: &str = "WEEK_OF_MONTH";
    pub const TIMEDELTA: &str = "TIMEDELTA";
}
