use std::collections::HashMap;

use serde_json::Value;

use crate::format::TableFormat;
use crate::metadata::{ColumnType, Metadata};
use crate::table::StatusTable;

/// The translator: renames columns between format dialects, enforces declared
/// cell types, and applies the metadata's row ordering. Holds only the
/// metadata document; tables pass through by value.
#[derive(Debug, Clone)]
pub struct StatusTableManager {
    metadata: Metadata,
}

impl StatusTableManager {
    #[must_use]
    pub const fn new(metadata: Metadata) -> Self {
        Self { metadata }
    }

    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Rename a table from `current` dialect to `target` dialect.
    ///
    /// Input columns are resolved to logical keys through the reverse lookup
    /// for `current`, falling back to the column name itself (tables already
    /// keyed by logical keys resolve cleanly; genuinely unmapped columns pass
    /// through the lookup and are dropped by the final projection). The
    /// output carries every column the metadata names for `target`, in
    /// metadata order, null-filled where the input had no source column.
    /// Nothing here ever fails: unmapped keys are not an error.
    #[must_use]
    pub fn rename_columns(
        &self,
        table: &StatusTable,
        target: TableFormat,
        current: TableFormat,
    ) -> StatusTable {
        let reverse = self.metadata.reverse_lookup(current);

        // Logical key -> input column position. Later input columns win,
        // matching the observed collapse when two columns share a key.
        let mut sources: HashMap<&str, usize> = HashMap::new();
        for (position, column) in table.columns().iter().enumerate() {
            let key = reverse.get(column).map_or(column.as_str(), String::as_str);
            sources.insert(key, position);
        }

        let mut out_columns = Vec::new();
        let mut pulls: Vec<Option<usize>> = Vec::new();
        for (key, spec) in &self.metadata.columns {
            if let Some(target_name) = spec.display_name(target) {
                out_columns.push(target_name.to_owned());
                pulls.push(sources.get(key.as_str()).copied());
            }
        }

        let mut out = StatusTable::new(out_columns);
        for row in table.rows() {
            let projected = pulls
                .iter()
                .map(|source| source.map_or(Value::Null, |i| row[i].clone()))
                .collect();
            out.push_row(projected);
        }
        if let Some(geometry) = table.geometry() {
            out.set_geometry(geometry.to_vec());
        }
        out
    }

    /// Enforce declared column types in place, resolving display names
    /// through `current`. Best-effort: malformed cells degrade to the type's
    /// zero value (empty string for dates, `0` for numerics) with a warning,
    /// never an error. Columns without a recognized dtype are untouched.
    pub fn enforce_types(&self, table: &mut StatusTable, current: TableFormat) {
        for (key, spec) in &self.metadata.columns {
            let Some(column_type) = spec.column_type() else {
                continue;
            };
            let Some(column) = spec.display_name(current) else {
                continue;
            };
            table.set_column_values(column, |value| coerce(column_type, value, key, column));
        }
    }

    /// Chained stable single-key passes over `sort_order`, in listed order.
    /// Each pass re-sorts stably, so the last listed key ends up the primary
    /// criterion; the chaining is what downstream consumers rely on. Keys
    /// absent from the table are skipped.
    pub fn sort_rows(&self, table: &mut StatusTable) {
        for key in &self.metadata.sort_order {
            table.stable_sort_by_column(key);
        }
    }
}

fn coerce(column_type: ColumnType, value: &Value, key: &str, column: &str) -> Value {
    match column_type {
        ColumnType::Date => coerce_date(value, key, column),
        ColumnType::Text => coerce_text(value),
        ColumnType::Numeric => coerce_numeric(value, key, column),
    }
}

fn coerce_date(value: &Value, key: &str, column: &str) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Value::String(String::new());
            }
            match parse_date(trimmed) {
                Some(date) => Value::String(date),
                None => {
                    tracing::warn!(%key, %column, cell = %raw, "unparseable date, degrading to empty");
                    Value::String(String::new())
                }
            }
        }
        other => {
            tracing::warn!(%key, %column, cell = %other, "non-string date cell, degrading to empty");
            Value::String(String::new())
        }
    }
}

/// Parse a date-ish string into ISO `%Y-%m-%d`. Placeholder dates whose
/// digits are all zero (`0000/00/00` and friends) become empty.
fn parse_date(raw: &str) -> Option<String> {
    if raw
        .chars()
        .filter(char::is_ascii_digit)
        .all(|c| c == '0')
    {
        return Some(String::new());
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date().format("%Y-%m-%d").to_string());
    }
    for pattern in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, pattern) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn coerce_text(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        Value::Null => Value::String(String::new()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => Value::String(other.to_string()),
    }
}

fn coerce_numeric(value: &Value, key: &str, column: &str) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::Bool(b) => Value::from(i64::from(*b)),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if let Ok(int) = trimmed.parse::<i64>() {
                return Value::from(int);
            }
            if let Ok(float) = trimmed.parse::<f64>() {
                if let Some(number) = serde_json::Number::from_f64(float) {
                    return Value::Number(number);
                }
            }
            tracing::warn!(%key, %column, cell = %raw, "unparseable number, degrading to 0");
            Value::from(0)
        }
        other => {
            if !other.is_null() {
                tracing::warn!(%key, %column, cell = %other, "non-numeric cell, degrading to 0");
            }
            Value::from(0)
        }
    }
}
