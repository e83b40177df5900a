use snafu::Location;
use snafu::prelude::*;

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ExportError {
    #[snafu(display("Failed to create output directory {path}: {source}"))]
    CreateDirectory {
        path: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Excel write failed for {path}: {source}"))]
    WriteExcel {
        path: String,
        source: rust_xlsxwriter::XlsxError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Excel read failed for {path}: {source}"))]
    ReadExcel {
        path: String,
        source: calamine::XlsxError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Sheet {sheet} in {path} has no header row"))]
    EmptySheet {
        path: String,
        sheet: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Shapefile write failed for {path}: {source}"))]
    WriteShapefile {
        path: String,
        source: shapefile::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{name} is not usable as a dBASE field name"))]
    FieldName {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
}
