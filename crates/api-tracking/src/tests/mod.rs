#![allow(clippy::unwrap_used, clippy::expect_used)]

mod tracking;

use std::net::SocketAddr;

use core_schema::Metadata;
use serde_json::json;

use crate::state::TrackingConfig;
use crate::test_server::run_test_server;

fn sample_metadata() -> Metadata {
    serde_json::from_value(json!({
        "columns": {
            "HUC8": {"geojson": "HUC8", "excel": "HUC8 ID", "shapefile": "HUC8", "dtype": "string"},
            "Name": {"geojson": "Name", "excel": "Area Name", "shapefile": "Name", "dtype": "string"},
            "FP_MIP": {"geojson": "FP_MIP", "excel": "FP MIP", "shapefile": "FP_MIP", "dtype": "string"},
            "Draft_MIP": {"geojson": "Draft_MIP", "excel": "Draft MIP Date", "shapefile": "Draft_MIP", "dtype": "date"},
            "FRP_Perc_Complete": {"geojson": "FRP_Perc_Complete", "excel": "FRP % Complete", "shapefile": "FRP_Perc", "dtype": "numeric"},
            "last_updated": {"geojson": "last_updated", "excel": "Last Updated", "shapefile": "last_upd", "dtype": "date"}
        },
        "sort_order": ["HUC8"]
    }))
    .unwrap()
}

fn square(origin: f64) -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [origin, origin], [origin + 1.0, origin],
            [origin + 1.0, origin + 1.0], [origin, origin + 1.0],
            [origin, origin]
        ]]
    })
}

/// Seed a tracking file with two watersheds and boot a server over it. The
/// returned `TempDir` owns every path in the config; keep it alive for the
/// duration of the test.
fn run_seeded_server() -> (tempfile::TempDir, TrackingConfig, SocketAddr) {
    let dir = tempfile::tempdir().unwrap();
    let config = TrackingConfig {
        geojson_path: dir.path().join("IA_BLE_Tracking.geojson"),
        backup_dir: dir.path().join("backups"),
        excel_path: dir.path().join("exports").join("IA_BLE_Tracking.xlsx"),
        shapefile_path: dir.path().join("exports").join("IA_BLE_Tracking.shp"),
        sheet_name: "Tracking_Main".to_string(),
        key_column: "HUC8".to_string(),
        name_column: "Name".to_string(),
        timestamp_column: "last_updated".to_string(),
    };

    let collection = json!({
        "type": "FeatureCollection",
        "name": "IA_BLE_Tracking",
        "features": [
            {
                "type": "Feature",
                "geometry": square(0.0),
                "properties": {
                    "HUC8": "07080101", "Name": "Turkey", "FP_MIP": "In Progress",
                    "Draft_MIP": "2024-01-02", "FRP_Perc_Complete": 40,
                    "last_updated": "2024-01-01"
                }
            },
            {
                "type": "Feature",
                "geometry": square(5.0),
                "properties": {
                    "HUC8": "07060004", "Name": "Maquoketa", "FP_MIP": "Pending",
                    "Draft_MIP": "2024-02-01", "FRP_Perc_Complete": 12.5,
                    "last_updated": "2024-01-01"
                }
            }
        ]
    });
    std::fs::write(
        &config.geojson_path,
        serde_json::to_string_pretty(&collection).unwrap(),
    )
    .unwrap();

    let addr = run_test_server(sample_metadata(), config.clone());
    (dir, config, addr)
}
