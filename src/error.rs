//! Error types for the forecast-kpi library.

use thiserror::Error;

/// Result type alias for KPI operations.
pub type Result<T> = std::result::Result<T, KpiError>;

/// Errors that can occur while building tables or computing KPIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KpiError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// A referenced column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A column exists but holds a different kind of data.
    #[error("column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A column name was used twice.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column length differs from the table length.
    #[error("length mismatch in column '{column}': expected {expected}, got {got}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    /// Row index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Chart or theme export failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A metric whose denominator is zero was requested as a value.
    #[error("metric '{metric}' is undefined: {reason}")]
    UndefinedMetric {
        metric: &'static str,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = KpiError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = KpiError::ColumnNotFound("target".to_string());
        assert_eq!(err.to_string(), "column not found: target");

        let err = KpiError::ColumnType {
            column: "region".to_string(),
            expected: "numeric",
            found: "categorical",
        };
        assert_eq!(
            err.to_string(),
            "column 'region' has type categorical, expected numeric"
        );

        let err = KpiError::LengthMismatch {
            column: "pred".to_string(),
            expected: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch in column 'pred': expected 3, got 2"
        );

        let err = KpiError::IndexOutOfBounds { index: 7, size: 3 };
        assert_eq!(err.to_string(), "index out of bounds: 7 (size: 3)");

        let err = KpiError::UndefinedMetric {
            metric: "Bias",
            reason: "total actuals are zero",
        };
        assert_eq!(
            err.to_string(),
            "metric 'Bias' is undefined: total actuals are zero"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = KpiError::DuplicateColumn("YEAR".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
