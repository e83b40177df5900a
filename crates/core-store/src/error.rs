use snafu::Location;
use snafu::prelude::*;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("Failed to read tracking file {path}: {source}"))]
    ReadTracking {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Malformed GeoJSON in {path}: {source}"))]
    ParseGeoJson {
        path: String,
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{path} is not a FeatureCollection (type: {found})"))]
    NotFeatureCollection {
        path: String,
        found: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(transparent)]
    Schema {
        source: core_schema::SchemaError,
    },

    #[snafu(display("Key column {column} is missing from the stored table"))]
    KeyColumnMissing {
        column: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Column {column} is missing from the stored table"))]
    ColumnMissing {
        column: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to serialize tracking data: {source}"))]
    SerializeTracking {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to take backup of {path}: {source}"))]
    Backup {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to stage write for {path}: {source}"))]
    StageWrite {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to commit write to {path}: {source}"))]
    CommitWrite {
        path: String,
        source: tempfile::PersistError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to write records mirror {path}: {source}"))]
    WriteMirror {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}
