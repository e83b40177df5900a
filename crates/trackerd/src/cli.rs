use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(version, about, long_about=None)]
pub struct CliOpts {
    #[arg(
        long,
        env = "TRACKING_HOST",
        default_value = "localhost",
        help = "Host to bind to"
    )]
    pub host: String,

    #[arg(
        long,
        env = "TRACKING_PORT",
        default_value = "3000",
        help = "Port to bind to"
    )]
    pub port: u16,

    #[arg(
        long,
        env = "TRACKING_METADATA_FILE",
        value_name = "PATH",
        default_value = "config/tracking_columns.json",
        help = "Path to the column metadata JSON document"
    )]
    pub metadata_file: PathBuf,

    #[arg(
        long,
        env = "TRACKING_GEOJSON_FILE",
        value_name = "PATH",
        default_value = "data/IA_BLE_Tracking.geojson",
        help = "Path to the GeoJSON tracking file, the source of truth"
    )]
    pub geojson_file: PathBuf,

    #[arg(
        long,
        env = "TRACKING_BACKUP_DIR",
        value_name = "PATH",
        default_value = "data/backups",
        help = "Directory timestamped backups are copied into before each write"
    )]
    pub backup_dir: PathBuf,

    #[arg(
        long,
        env = "TRACKING_EXCEL_FILE",
        value_name = "PATH",
        default_value = "exports/IA_BLE_Tracking.xlsx",
        help = "Path the Excel export is written to"
    )]
    pub excel_file: PathBuf,

    #[arg(
        long,
        env = "TRACKING_SHAPEFILE",
        value_name = "PATH",
        default_value = "exports/IA_BLE_Tracking.shp",
        help = "Path the Shapefile export is written to"
    )]
    pub shapefile_file: PathBuf,

    #[arg(
        long,
        env = "TRACKING_SHEET_NAME",
        default_value = "Tracking_Main",
        help = "Main worksheet name in the Excel export"
    )]
    pub sheet_name: String,

    #[arg(
        long,
        env = "TRACKING_KEY_COLUMN",
        default_value = "HUC8",
        help = "Column updates are keyed by, in the GeoJSON dialect"
    )]
    pub key_column: String,

    #[arg(
        long,
        env = "TRACKING_NAME_COLUMN",
        default_value = "Name",
        help = "Column batch status edits match substrings against"
    )]
    pub name_column: String,

    #[arg(
        long,
        env = "TRACKING_TIMESTAMP_COLUMN",
        default_value = "last_updated",
        help = "Column stamped with today's date on changed rows"
    )]
    pub timestamp_column: String,

    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECS",
        default_value = "60",
        help = "Maximum duration in seconds a single request is allowed to run"
    )]
    pub request_timeout_secs: u64,

    #[arg(
        long,
        value_enum,
        env = "TRACING_LEVEL",
        default_value = "info",
        help = "Tracing level, it can be overrided by *RUST_LOG* env var"
    )]
    pub tracing_level: TracingLevel,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TracingLevel {
    Off,
    Info,
    Debug,
    Trace,
}

#[allow(clippy::from_over_into)]
impl Into<LevelFilter> for TracingLevel {
    fn into(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::OFF,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}
