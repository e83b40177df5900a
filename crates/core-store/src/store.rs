use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snafu::ResultExt;
use tempfile::NamedTempFile;

use core_schema::StatusTable;

use crate::error::{self, Result};
use crate::geojson::FeatureCollection;

/// Counts reported back from a diff update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Owner of the GeoJSON source-of-truth file. All mutations funnel through
/// `save`, which takes a backup copy first and then replaces the primary via
/// write-to-temp-then-rename, so a crash mid-write never corrupts it. The
/// geometry-free records mirror (`.json` next to the `.geojson`) is
/// regenerated after every committed write.
#[derive(Debug)]
pub struct TrackingStore {
    geojson_path: PathBuf,
    backup_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl TrackingStore {
    #[must_use]
    pub fn new(geojson_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            geojson_path: geojson_path.into(),
            backup_dir: backup_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.geojson_path
    }

    #[must_use]
    pub fn mirror_path(&self) -> PathBuf {
        self.geojson_path.with_extension("json")
    }

    pub fn load_collection(&self) -> Result<FeatureCollection> {
        let path = self.geojson_path.display().to_string();
        let raw =
            std::fs::read_to_string(&self.geojson_path).context(error::ReadTrackingSnafu {
                path: path.clone(),
            })?;
        let collection: FeatureCollection =
            serde_json::from_str(&raw).context(error::ParseGeoJsonSnafu { path: path.clone() })?;
        snafu::ensure!(
            collection.is_feature_collection(),
            error::NotFeatureCollectionSnafu {
                path,
                found: collection.collection_type.clone(),
            }
        );
        Ok(collection)
    }

    /// The stored table, geometry attached.
    pub fn load(&self) -> Result<StatusTable> {
        Ok(self.load_collection()?.to_table())
    }

    /// Commit a new table state: backup, atomic replace, refresh the mirror.
    pub fn save(&self, table: &StatusTable) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // Carry the collection-level name/crs of the current file forward.
        let (name, crs) = if self.geojson_path.exists() {
            let current = self.load_collection()?;
            (current.name, current.crs)
        } else {
            (None, None)
        };
        let collection = FeatureCollection::from_table(table, name, crs);
        let bytes =
            serde_json::to_vec_pretty(&collection).context(error::SerializeTrackingSnafu)?;

        self.take_backup()?;
        self.stage(&bytes)?.commit()?;
        self.write_mirror(table)?;

        tracing::info!(path = %self.geojson_path.display(), rows = table.len(), "tracking file committed");
        Ok(())
    }

    /// Copy the current primary into the backup directory, timestamped.
    /// Nothing to back up on the very first write.
    pub fn take_backup(&self) -> Result<Option<PathBuf>> {
        if !self.geojson_path.exists() {
            return Ok(None);
        }
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        let stem = self
            .geojson_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tracking".to_string());
        let backup_path = self.backup_dir.join(format!("{stem}_{stamp}.geojson"));

        std::fs::create_dir_all(&self.backup_dir).context(error::BackupSnafu {
            path: self.backup_dir.display().to_string(),
        })?;
        std::fs::copy(&self.geojson_path, &backup_path).context(error::BackupSnafu {
            path: backup_path.display().to_string(),
        })?;
        Ok(Some(backup_path))
    }

    /// Write the new content to a temp file in the primary's directory. The
    /// primary is untouched until `commit` renames over it.
    fn stage(&self, bytes: &[u8]) -> Result<StagedWrite> {
        let parent = self
            .geojson_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        std::fs::create_dir_all(&parent).context(error::StageWriteSnafu {
            path: parent.display().to_string(),
        })?;
        let mut temp = NamedTempFile::new_in(&parent).context(error::StageWriteSnafu {
            path: self.geojson_path.display().to_string(),
        })?;
        temp.write_all(bytes).context(error::StageWriteSnafu {
            path: self.geojson_path.display().to_string(),
        })?;
        temp.flush().context(error::StageWriteSnafu {
            path: self.geojson_path.display().to_string(),
        })?;
        Ok(StagedWrite {
            temp,
            target: self.geojson_path.clone(),
        })
    }

    fn write_mirror(&self, table: &StatusTable) -> Result<()> {
        let mirror = self.mirror_path();
        let records = table.to_records();
        let rendered =
            serde_json::to_vec_pretty(&records).context(error::SerializeTrackingSnafu)?;
        std::fs::write(&mirror, rendered).context(error::WriteMirrorSnafu {
            path: mirror.display().to_string(),
        })
    }

    /// Diff incoming records (keyed by `key_column`) against the stored
    /// geometry-bearing table and persist only changed rows. Changed rows get
    /// `timestamp_column` set to today's date. Records whose key matches no
    /// stored row are skipped with a warning.
    pub fn apply_updates(
        &self,
        records: &[Map<String, Value>],
        key_column: &str,
        timestamp_column: &str,
    ) -> Result<UpdateOutcome> {
        let mut table = self.load()?;
        snafu::ensure!(
            table.column_index(key_column).is_some(),
            error::KeyColumnMissingSnafu { column: key_column }
        );

        // Stored key -> row position.
        let mut index = std::collections::HashMap::new();
        for row in 0..table.len() {
            if let Some(cell) = table.cell(row, key_column) {
                index.insert(value_key(cell), row);
            }
        }

        let today = chrono::Local::now()
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        let mut updated = 0;
        let mut skipped = 0;
        for record in records {
            let Some(key) = record.get(key_column).map(value_key) else {
                skipped += 1;
                tracing::warn!(column = key_column, "record without key column skipped");
                continue;
            };
            let Some(&row) = index.get(&key) else {
                skipped += 1;
                tracing::warn!(column = key_column, %key, "record matches no stored row");
                continue;
            };

            let mut changed = false;
            for (column, incoming) in record {
                if column.as_str() == key_column || column.as_str() == timestamp_column {
                    continue;
                }
                match table.cell(row, column) {
                    Some(current) if !eq_loose(current, incoming) => {
                        table.set_cell(row, column, incoming.clone());
                        changed = true;
                    }
                    // unknown columns and unchanged cells
                    _ => {}
                }
            }
            if changed {
                table.set_cell(row, timestamp_column, Value::String(today.clone()));
                updated += 1;
            }
        }

        if updated > 0 {
            self.save(&table)?;
        }
        Ok(UpdateOutcome {
            updated,
            skipped,
            total: records.len(),
        })
    }

    /// Batch status update: every row whose `name_column` contains any of the
    /// given substrings gets `column` set to `value`. Persists only when a
    /// row actually changed.
    pub fn update_status_where(
        &self,
        name_contains: &[String],
        name_column: &str,
        column: &str,
        value: &str,
    ) -> Result<usize> {
        let mut table = self.load()?;
        snafu::ensure!(
            table.column_index(column).is_some(),
            error::ColumnMissingSnafu { column }
        );
        snafu::ensure!(
            table.column_index(name_column).is_some(),
            error::ColumnMissingSnafu {
                column: name_column
            }
        );

        let mut touched = 0;
        for row in 0..table.len() {
            let matches = table
                .cell(row, name_column)
                .and_then(Value::as_str)
                .is_some_and(|name| name_contains.iter().any(|needle| name.contains(needle.as_str())));
            if !matches {
                continue;
            }
            let already = table
                .cell(row, column)
                .and_then(Value::as_str)
                .is_some_and(|current| current == value);
            if !already {
                table.set_cell(row, column, Value::String(value.to_string()));
                touched += 1;
            }
        }

        if touched > 0 {
            self.save(&table)?;
        }
        Ok(touched)
    }
}

/// A written-but-uncommitted replacement for the primary file.
struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    fn commit(self) -> Result<()> {
        self.temp
            .persist(&self.target)
            .map(drop)
            .context(error::CommitWriteSnafu {
                path: self.target.display().to_string(),
            })
    }
}

/// Canonical string form of a key cell so `1902` and `"1902"` index the same
/// row regardless of which format the record came through.
fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.as_f64().map_or_else(
            || n.to_string(),
            |f| {
                if f.fract() == 0.0 && f.abs() < 9e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            },
        ),
        other => other.to_string(),
    }
}

/// Equality that tolerates the numeric/text drift introduced by the Excel
/// round trip: `40` == `40.0` == `"40"`.
fn eq_loose(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(_) | Value::String(_), Value::Number(_) | Value::String(_)) => {
            value_key(a) == value_key(b)
        }
        (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
        _ => false,
    }
}
