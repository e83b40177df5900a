use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::tracking::handlers::{
    export_excel, export_shapefile, get_tracking_table, post_tracking_table, update_status,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/table", get(get_tracking_table).post(post_tracking_table))
        .route("/status", post(update_status))
        .route("/export/excel", post(export_excel))
        .route("/export/shapefile", post(export_shapefile))
}
