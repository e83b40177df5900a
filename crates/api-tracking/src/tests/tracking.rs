use serde_json::json;

use crate::error::ErrorResponse;
use crate::tests::run_seeded_server;
use crate::tracking::models::{
    ExportResponse, StatusUpdateResponse, TrackingTableResponse, TrackingUpdateResponse,
};

#[tokio::test]
async fn test_get_table_translates_to_excel_dialect() {
    let (_dir, _config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/tracking/table?format=excel"))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::OK, res.status());
    let table: TrackingTableResponse = res.json().await.unwrap();

    assert_eq!(
        table.columns,
        [
            "HUC8 ID",
            "Area Name",
            "FP MIP",
            "Draft MIP Date",
            "FRP % Complete",
            "Last Updated"
        ]
    );
    assert_eq!(table.total, 2);
    // sorted by key, so the lower HUC8 comes first
    assert_eq!(table.items[0]["HUC8 ID"], json!("07060004"));
    assert_eq!(table.items[0]["FRP % Complete"], json!(12.5));
    assert_eq!(table.items[1]["Area Name"], json!("Turkey"));
}

#[tokio::test]
async fn test_get_table_defaults_to_geojson_dialect() {
    let (_dir, _config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/tracking/table"))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::OK, res.status());
    let table: TrackingTableResponse = res.json().await.unwrap();
    assert_eq!(
        table.columns,
        ["HUC8", "Name", "FP_MIP", "Draft_MIP", "FRP_Perc_Complete", "last_updated"]
    );

    // unknown dialect never reaches the handler
    let res = client
        .get(format!("http://{addr}/tracking/table?format=parquet"))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test]
async fn test_post_table_updates_changed_rows_and_stamps_date() {
    let (_dir, config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    // Whole-row snapshot in the excel dialect; only FP MIP differs.
    let res = client
        .post(format!("http://{addr}/tracking/table"))
        .json(&json!({
            "format": "excel",
            "records": [{
                "HUC8 ID": "07080101", "Area Name": "Turkey", "FP MIP": "Delivered",
                "Draft MIP Date": "2024-01-02", "FRP % Complete": 40,
                "Last Updated": "2024-01-01"
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::OK, res.status());
    let outcome: TrackingUpdateResponse = res.json().await.unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.total, 1);

    let res = client
        .get(format!("http://{addr}/tracking/table"))
        .send()
        .await
        .unwrap();
    let table: TrackingTableResponse = res.json().await.unwrap();
    let today = chrono::Local::now()
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();
    assert_eq!(table.items[1]["FP_MIP"], json!("Delivered"));
    assert_eq!(table.items[1]["last_updated"], json!(today));
    // the untouched row keeps its stamp
    assert_eq!(table.items[0]["last_updated"], json!("2024-01-01"));

    // the overwritten state was backed up first
    let backups = std::fs::read_dir(&config.backup_dir).unwrap().count();
    assert_eq!(backups, 1);
}

#[tokio::test]
async fn test_post_table_rejects_empty_records() {
    let (_dir, _config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/tracking/table"))
        .json(&json!({"format": "excel", "records": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::BAD_REQUEST, res.status());
    let error: ErrorResponse = res.json().await.unwrap();
    assert_eq!(error.status_code, http::StatusCode::BAD_REQUEST.as_u16());
}

#[tokio::test]
async fn test_status_update_touches_rows_by_name_substring() {
    let (_dir, _config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/tracking/status"))
        .json(&json!({
            "nameContains": ["Maquo"],
            "column": "FP_MIP",
            "value": "In Backcheck"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::OK, res.status());
    let outcome: StatusUpdateResponse = res.json().await.unwrap();
    assert_eq!(outcome.updated, 1);

    let res = client
        .get(format!("http://{addr}/tracking/table"))
        .send()
        .await
        .unwrap();
    let table: TrackingTableResponse = res.json().await.unwrap();
    assert_eq!(table.items[0]["FP_MIP"], json!("In Backcheck"));
    assert_eq!(table.items[1]["FP_MIP"], json!("In Progress"));
}

#[tokio::test]
async fn test_status_update_unknown_column_is_bad_request() {
    let (_dir, _config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/tracking/status"))
        .json(&json!({
            "nameContains": ["Turkey"],
            "column": "NoSuchColumn",
            "value": "Delivered"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test]
async fn test_export_excel_writes_two_sheet_workbook() {
    let (_dir, config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/tracking/export/excel"))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::OK, res.status());
    let export: ExportResponse = res.json().await.unwrap();
    assert_eq!(export.rows, 2);
    assert!(config.excel_path.exists());

    let table = core_export::read_excel(
        &config.excel_path,
        &core_export::values_sheet_name(&config.sheet_name),
    )
    .unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "HUC8 ID"), Some(&json!("07060004")));
}

#[tokio::test]
async fn test_export_shapefile_writes_every_feature() {
    let (_dir, config, addr) = run_seeded_server();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{addr}/tracking/export/shapefile"))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::OK, res.status());
    let export: ExportResponse = res.json().await.unwrap();
    assert_eq!(export.rows, 2);
    assert!(config.shapefile_path.exists());
}

#[tokio::test]
async fn test_get_table_missing_file_is_not_found() {
    let (dir, config, addr) = run_seeded_server();
    std::fs::remove_file(&config.geojson_path).unwrap();

    let client = reqwest::Client::new();
    let res = client
        .get(format!("http://{addr}/tracking/table"))
        .send()
        .await
        .unwrap();
    assert_eq!(http::StatusCode::NOT_FOUND, res.status());
    let error: ErrorResponse = res.json().await.unwrap();
    assert_eq!(error.status_code, http::StatusCode::NOT_FOUND.as_u16());
    drop(dir);
}
