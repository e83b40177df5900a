use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{self, Result};
use crate::format::TableFormat;

/// Declared cell type for a column. Unknown dtype strings in the metadata
/// document are preserved on the wire but act as untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Text,
    Numeric,
}

impl ColumnType {
    #[must_use]
    pub fn parse(dtype: &str) -> Option<Self> {
        match dtype {
            "date" => Some(Self::Date),
            "string" => Some(Self::Text),
            "numeric" => Some(Self::Numeric),
            _ => None,
        }
    }
}

/// Per-format display names and declared type for one logical column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapefile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
}

impl ColumnSpec {
    #[must_use]
    pub fn display_name(&self, format: TableFormat) -> Option<&str> {
        match format {
            TableFormat::GeoJson => self.geojson.as_deref(),
            TableFormat::Excel => self.excel.as_deref(),
            TableFormat::Shapefile => self.shapefile.as_deref(),
        }
    }

    #[must_use]
    pub fn column_type(&self) -> Option<ColumnType> {
        self.dtype.as_deref().and_then(ColumnType::parse)
    }
}

/// The metadata document: an ordered mapping of logical key to column spec
/// plus the row sort order. Iteration order of `columns` is the column order
/// of every output format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub columns: IndexMap<String, ColumnSpec>,
    #[serde(default)]
    pub sort_order: Vec<String>,
}

impl Metadata {
    /// Logical key -> display name for one format, in document order.
    /// Columns without a name in that format map to `None`.
    #[must_use]
    pub fn column_names(&self, format: TableFormat) -> IndexMap<String, Option<String>> {
        self.columns
            .iter()
            .map(|(key, spec)| (key.clone(), spec.display_name(format).map(str::to_owned)))
            .collect()
    }

    /// Display name -> logical key for one format. Columns without a name in
    /// that format are absent.
    #[must_use]
    pub fn reverse_lookup(&self, format: TableFormat) -> IndexMap<String, String> {
        self.columns
            .iter()
            .filter_map(|(key, spec)| {
                spec.display_name(format)
                    .map(|name| (name.to_owned(), key.clone()))
            })
            .collect()
    }
}

/// Scoped access to the metadata JSON document. `open` loads it; `close` is
/// the explicit scope-exit pair that regenerates the TOML mirror. The mirror
/// is also separately callable so committed metadata changes can republish it
/// without tearing the store down.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
    metadata: Metadata,
}

impl MetadataStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path).context(error::ReadMetadataSnafu {
            path: path.display().to_string(),
        })?;
        let metadata: Metadata = serde_json::from_str(&raw).context(error::ParseMetadataSnafu)?;
        Ok(Self { path, metadata })
    }

    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn mirror_path(&self) -> PathBuf {
        self.path.with_extension("toml")
    }

    /// Write the TOML rendition of the document next to the JSON file.
    pub fn mirror_toml(&self) -> Result<PathBuf> {
        let mirror = self.mirror_path();
        let rendered =
            toml::to_string_pretty(&self.metadata).context(error::SerializeMirrorSnafu)?;
        std::fs::write(&mirror, rendered).context(error::WriteMirrorSnafu {
            path: mirror.display().to_string(),
        })?;
        Ok(mirror)
    }

    /// Explicit teardown: mirror, then drop.
    pub fn close(self) -> Result<()> {
        self.mirror_toml()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> Metadata {
        serde_json::from_value(serde_json::json!({
            "columns": {
                "HUC8": {"geojson": "HUC8", "excel": "HUC8 ID", "shapefile": "HUC8", "dtype": "string"},
                "Name": {"geojson": "Name", "excel": "Area Name", "shapefile": "Name", "dtype": "string"},
                "Draft_MIP": {"geojson": "Draft_MIP", "excel": "Draft MIP Date", "dtype": "date"}
            },
            "sort_order": ["Name", "HUC8"]
        }))
        .unwrap()
    }

    #[test]
    fn preserves_column_order() {
        let metadata = sample_metadata();
        let keys: Vec<_> = metadata.columns.keys().cloned().collect();
        assert_eq!(keys, vec!["HUC8", "Name", "Draft_MIP"]);
    }

    #[test]
    fn reverse_lookup_skips_absent_formats() {
        let metadata = sample_metadata();
        let reverse = metadata.reverse_lookup(TableFormat::Shapefile);
        assert_eq!(reverse.get("HUC8"), Some(&"HUC8".to_string()));
        // Draft_MIP has no shapefile name
        assert_eq!(reverse.len(), 2);
    }

    #[test]
    fn open_then_close_writes_toml_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("tracking_columns.json");
        std::fs::write(
            &json_path,
            serde_json::to_string_pretty(&sample_metadata()).unwrap(),
        )
        .unwrap();

        let store = MetadataStore::open(&json_path).unwrap();
        let mirror = store.mirror_path();
        store.close().unwrap();

        let raw = std::fs::read_to_string(mirror).unwrap();
        let roundtripped: Metadata = toml::from_str(&raw).unwrap();
        assert_eq!(roundtripped, sample_metadata());
    }

    #[test]
    fn open_rejects_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("bad.json");
        std::fs::write(&json_path, "{\"columns\": 7}").unwrap();
        let err = MetadataStore::open(&json_path).unwrap_err();
        assert!(matches!(err, crate::SchemaError::ParseMetadata { .. }));
    }
}
