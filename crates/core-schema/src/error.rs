use snafu::Location;
use snafu::prelude::*;

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

/// Structural failures only. Bad cell values never surface here; they are
/// degraded in place by the type-enforcement pass.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SchemaError {
    #[snafu(display("Failed to read metadata file {path}: {source}"))]
    ReadMetadata {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Malformed metadata document: {source}"))]
    ParseMetadata {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to serialize metadata for the TOML mirror: {source}"))]
    SerializeMirror {
        source: toml::ser::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to write TOML mirror {path}: {source}"))]
    WriteMirror {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Expected an array of records, got {found}"))]
    NotTabular {
        found: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Record {index} is not a JSON object"))]
    RecordNotObject {
        index: usize,
        #[snafu(implicit)]
        location: Location,
    },
}
