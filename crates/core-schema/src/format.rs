use serde::{Deserialize, Serialize};

/// The three dialects one logical column can be spelled in. A closed enum so
/// a typo in a format name is a compile error, not a silent no-op mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    GeoJson,
    Excel,
    Shapefile,
}

impl TableFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeoJson => "geojson",
            Self::Excel => "excel",
            Self::Shapefile => "shapefile",
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
