use std::path::PathBuf;
use std::sync::Arc;

use core_schema::StatusTableManager;
use core_store::TrackingStore;

/// Filesystem layout and column conventions the handlers operate with.
/// Column names here are in the GeoJSON dialect, the dialect of the stored
/// table.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub geojson_path: PathBuf,
    pub backup_dir: PathBuf,
    pub excel_path: PathBuf,
    pub shapefile_path: PathBuf,
    pub sheet_name: String,
    pub key_column: String,
    pub name_column: String,
    pub timestamp_column: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TrackingStore>,
    pub manager: Arc<StatusTableManager>,
    pub config: Arc<TrackingConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(store: TrackingStore, manager: StatusTableManager, config: TrackingConfig) -> Self {
        Self {
            store: Arc::new(store),
            manager: Arc::new(manager),
            config: Arc::new(config),
        }
    }
}
