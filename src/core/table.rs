//! Column-oriented observation table.

use crate::core::key::KeyValue;
use crate::error::{KpiError, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// A named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Free-text categorical values (product code, region, ...).
    Categorical(Vec<String>),
    /// Integer values (calendar fields, counts).
    Integer(Vec<i64>),
    /// Timestamps.
    Timestamp(Vec<DateTime<Utc>>),
    /// Nullable floating point values; `None` marks a missing observation.
    Numeric(Vec<Option<f64>>),
}

impl Column {
    /// Build a numeric column, mapping NaN and infinities to missing.
    pub fn numeric(values: Vec<f64>) -> Self {
        Column::Numeric(
            values
                .into_iter()
                .map(|v| if v.is_finite() { Some(v) } else { None })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Timestamp(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable name of the column kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Categorical(_) => "categorical",
            Column::Integer(_) => "integer",
            Column::Timestamp(_) => "timestamp",
            Column::Numeric(_) => "numeric",
        }
    }

    /// Whether values of this column can serve as group or join keys.
    pub fn is_key(&self) -> bool {
        !matches!(self, Column::Numeric(_))
    }

    /// Key value at `row`, or `None` for numeric columns.
    pub fn key(&self, row: usize) -> Option<KeyValue> {
        match self {
            Column::Categorical(v) => v.get(row).map(|s| KeyValue::Text(s.clone())),
            Column::Integer(v) => v.get(row).map(|&i| KeyValue::Integer(i)),
            Column::Timestamp(v) => v.get(row).map(|&t| KeyValue::Timestamp(t)),
            Column::Numeric(_) => None,
        }
    }

    /// Map NaN and infinities of a numeric column to missing.
    fn into_finite(self) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(
                v.into_iter()
                    .map(|x| x.filter(|x| x.is_finite()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Gather the given rows into a new column. Indices must be in range.
    pub(crate) fn gather(&self, indices: &[usize]) -> Column {
        match self {
            Column::Categorical(v) => {
                Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
            Column::Integer(v) => Column::Integer(indices.iter().map(|&i| v[i]).collect()),
            Column::Timestamp(v) => Column::Timestamp(indices.iter().map(|&i| v[i]).collect()),
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Per-field reduction applied by [`ObservationTable::group_reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Sum of present values; a group with no present values sums to 0.
    #[default]
    Sum,
    /// Mean of present values; missing when no value is present.
    Mean,
    /// First present value in encounter order.
    First,
}

/// An in-memory table of observations with named, equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    len: usize,
    names: Vec<String>,
    columns: Vec<Column>,
}

/// Builder for constructing an [`ObservationTable`].
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    columns: Vec<(String, Column)>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.push((name.into(), column));
        self
    }

    pub fn categorical<S: Into<String>>(self, name: impl Into<String>, values: Vec<S>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.column(name, Column::Categorical(values))
    }

    pub fn integer(self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.column(name, Column::Integer(values))
    }

    pub fn timestamp(self, name: impl Into<String>, values: Vec<DateTime<Utc>>) -> Self {
        self.column(name, Column::Timestamp(values))
    }

    /// Numeric column; NaN values become missing.
    pub fn numeric(self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.column(name, Column::numeric(values))
    }

    /// Numeric column with explicit missing values; NaN is missing too.
    pub fn nullable(self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.column(name, Column::Numeric(values))
    }

    pub fn build(self) -> Result<ObservationTable> {
        let mut table = ObservationTable::new();
        for (name, column) in self.columns {
            if table.has_column(&name) {
                return Err(KpiError::DuplicateColumn(name));
            }
            table.set_column(name, column)?;
        }
        Ok(table)
    }
}

impl ObservationTable {
    /// Create an empty table without columns.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| KpiError::ColumnNotFound(name.to_string()))
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        Ok(&self.columns[self.position(name)?])
    }

    fn type_error(name: &str, expected: &'static str, found: &Column) -> KpiError {
        KpiError::ColumnType {
            column: name.to_string(),
            expected,
            found: found.kind(),
        }
    }

    /// Get the values of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v),
            other => Err(Self::type_error(name, "numeric", other)),
        }
    }

    /// Get the values of a categorical column.
    pub fn categorical(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            Column::Categorical(v) => Ok(v),
            other => Err(Self::type_error(name, "categorical", other)),
        }
    }

    /// Get the values of an integer column.
    pub fn integers(&self, name: &str) -> Result<&[i64]> {
        match self.column(name)? {
            Column::Integer(v) => Ok(v),
            other => Err(Self::type_error(name, "integer", other)),
        }
    }

    /// Get the values of a timestamp column.
    pub fn timestamps(&self, name: &str) -> Result<&[DateTime<Utc>]> {
        match self.column(name)? {
            Column::Timestamp(v) => Ok(v),
            other => Err(Self::type_error(name, "timestamp", other)),
        }
    }

    /// Get a column that can be used as a group or join key.
    pub fn key_column(&self, name: &str) -> Result<&Column> {
        let column = self.column(name)?;
        if column.is_key() {
            Ok(column)
        } else {
            Err(Self::type_error(
                name,
                "categorical, integer or timestamp",
                column,
            ))
        }
    }

    /// All values of a key column, in row order.
    pub fn keys(&self, name: &str) -> Result<Vec<KeyValue>> {
        let column = self.key_column(name)?;
        Ok((0..self.len).filter_map(|i| column.key(i)).collect())
    }

    /// Add a column, or replace an existing column of the same name.
    ///
    /// The first column added to an empty table fixes the row count. NaN and
    /// infinite numeric values are stored as missing.
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.len = column.len();
        } else if column.len() != self.len {
            return Err(KpiError::LengthMismatch {
                column: name,
                expected: self.len,
                got: column.len(),
            });
        }

        let column = column.into_finite();
        match self.names.iter().position(|n| *n == name) {
            Some(idx) => self.columns[idx] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Consuming variant of [`set_column`](Self::set_column).
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.set_column(name, column)?;
        Ok(self)
    }

    /// Gather rows by index, in the given order.
    pub fn take(&self, indices: &[usize]) -> Result<ObservationTable> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.len) {
            return Err(KpiError::IndexOutOfBounds {
                index,
                size: self.len,
            });
        }
        Ok(self.gather(indices))
    }

    /// [`take`](Self::take) for indices known to be in range.
    pub(crate) fn gather(&self, indices: &[usize]) -> ObservationTable {
        ObservationTable {
            len: indices.len(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.gather(indices)).collect(),
        }
    }

    /// Keep rows for which `predicate(row_index)` holds.
    pub fn filter<F>(&self, mut predicate: F) -> ObservationTable
    where
        F: FnMut(usize) -> bool,
    {
        let indices: Vec<usize> = (0..self.len).filter(|&i| predicate(i)).collect();
        self.gather(&indices)
    }

    /// Group rows by the key columns and reduce each listed field.
    ///
    /// The output holds the key columns followed by the reduced fields, one row
    /// per distinct key combination in ascending key order.
    pub fn group_reduce(
        &self,
        keys: &[&str],
        fields: &[(&str, Reduction)],
    ) -> Result<ObservationTable> {
        if keys.is_empty() {
            return Err(KpiError::InvalidParameter(
                "at least one group key is required".to_string(),
            ));
        }

        let key_columns: Vec<&Column> = keys
            .iter()
            .map(|k| self.key_column(k))
            .collect::<Result<_>>()?;

        let mut groups: BTreeMap<Vec<KeyValue>, Vec<usize>> = BTreeMap::new();
        for row in 0..self.len {
            let key: Vec<KeyValue> = key_columns.iter().filter_map(|c| c.key(row)).collect();
            groups.entry(key).or_default().push(row);
        }

        let firsts: Vec<usize> = groups.values().map(|rows| rows[0]).collect();
        let mut builder = TableBuilder::new();
        for (name, column) in keys.iter().zip(&key_columns) {
            builder = builder.column(*name, column.gather(&firsts));
        }

        for &(field, reduction) in fields {
            let column = self.column(field)?;
            let reduced = match (column, reduction) {
                (Column::Numeric(values), _) => Column::Numeric(
                    groups
                        .values()
                        .map(|rows| reduce_numeric(values, rows, reduction))
                        .collect(),
                ),
                (other, Reduction::First) => other.gather(&firsts),
                (other, _) => return Err(Self::type_error(field, "numeric", other)),
            };
            builder = builder.column(field, reduced);
        }

        let mut table = builder.build()?;
        table.len = groups.len();
        Ok(table)
    }

    /// Sum of the present values of a numeric column.
    pub fn sum(&self, name: &str) -> Result<f64> {
        Ok(self.numeric(name)?.iter().flatten().sum())
    }

    /// Distinct values of a key column in first-encounter order.
    pub fn distinct(&self, name: &str) -> Result<Vec<KeyValue>> {
        let mut seen = HashSet::new();
        Ok(self
            .keys(name)?
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect())
    }
}

fn reduce_numeric(values: &[Option<f64>], rows: &[usize], reduction: Reduction) -> Option<f64> {
    let mut present = rows.iter().filter_map(|&i| values[i]);
    match reduction {
        Reduction::Sum => Some(present.sum()),
        Reduction::Mean => {
            let (sum, count) = present.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count == 0 {
                None
            } else {
                Some(sum / count as f64)
            }
        }
        Reduction::First => present.next(),
    }
}
