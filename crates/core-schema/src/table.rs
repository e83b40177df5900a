use std::cmp::Ordering;

use serde_json::{Map, Value};
use snafu::ensure;

use crate::error::{self, Result};

/// An in-memory attribute table: ordered column names and rows of JSON
/// values. Geometry, when present, rides alongside the rows and is opaque to
/// every translator operation (never renamed, retyped, or projected away).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    geometry: Option<Vec<Value>>,
}

impl StatusTable {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            geometry: None,
        }
    }

    /// Build a table from a JSON array of records. The column set is the
    /// union of record keys in first-seen order; cells missing from a record
    /// are null. Anything that is not an array of objects is a `SchemaError`.
    pub fn from_records(records: &Value) -> Result<Self> {
        let records = records.as_array().ok_or_else(|| {
            error::NotTabularSnafu {
                found: json_type_name(records).to_string(),
            }
            .build()
        })?;

        let mut objects = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            ensure!(record.is_object(), error::RecordNotObjectSnafu { index });
            // checked above
            objects.push(record.as_object().cloned().unwrap_or_default());
        }
        Ok(Self::from_objects(objects))
    }

    /// Infallible variant of [`StatusTable::from_records`] for callers that
    /// already hold JSON objects.
    #[must_use]
    pub fn from_objects(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self {
            columns,
            rows,
            geometry: None,
        }
    }

    #[must_use]
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Sets a cell, ignoring unknown columns and out-of-range rows.
    pub fn set_cell(&mut self, row: usize, column: &str, value: Value) {
        if let Some(index) = self.column_index(column) {
            if let Some(r) = self.rows.get_mut(row) {
                if let Some(cell) = r.get_mut(index) {
                    *cell = value;
                }
            }
        }
    }

    pub fn set_column_values(&mut self, column: &str, mut f: impl FnMut(&Value) -> Value) {
        if let Some(index) = self.column_index(column) {
            for row in &mut self.rows {
                row[index] = f(&row[index]);
            }
        }
    }

    pub fn set_geometry(&mut self, geometry: Vec<Value>) {
        debug_assert_eq!(geometry.len(), self.rows.len());
        self.geometry = Some(geometry);
    }

    #[must_use]
    pub fn geometry(&self) -> Option<&[Value]> {
        self.geometry.as_deref()
    }

    /// One stable pass by a single column. Rows and geometry are permuted
    /// together so geometry stays attached to its row.
    pub fn stable_sort_by_column(&mut self, column: &str) {
        let Some(index) = self.column_index(column) else {
            return;
        };
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| compare_values(&self.rows[a][index], &self.rows[b][index]));

        self.rows = permute(std::mem::take(&mut self.rows), &order);
        if let Some(geometry) = self.geometry.take() {
            self.geometry = Some(permute(geometry, &order));
        }
    }
}

fn permute<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .map(|&i| slots[i].take().unwrap_or_else(|| unreachable!()))
        .collect()
}

/// Total order over JSON values for row sorting: null < bool < number <
/// string < everything else. Numbers compare as f64; mixed kinds compare by
/// kind rank so sorting never panics on a ragged column.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
