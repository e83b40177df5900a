use axum::{
    Json,
    extract::{Query, State},
};
use core_export::{values_sheet_name, write_excel, write_shapefile};
use core_schema::{StatusTable, TableFormat};
use snafu::ResultExt;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ErrorResponse;
use crate::state::AppState;
use crate::tracking::error::{self, TrackingResult};
use crate::tracking::models::{
    ExportResponse, StatusUpdatePayload, StatusUpdateResponse, TableQueryParameters,
    TrackingTableResponse, TrackingUpdatePayload, TrackingUpdateResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_tracking_table,
        post_tracking_table,
        update_status,
        export_excel,
        export_shapefile,
    ),
    components(
        schemas(
            TrackingTableResponse,
            TrackingUpdatePayload,
            TrackingUpdateResponse,
            StatusUpdatePayload,
            StatusUpdateResponse,
            ExportResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "tracking", description = "Tracking table endpoints")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    operation_id = "getTrackingTable",
    tags = ["tracking"],
    path = "/tracking/table",
    params(
        ("format" = Option<String>, Query, description = "Dialect: geojson, excel or shapefile")
    ),
    responses(
        (status = 200, description = "Successful Response", body = TrackingTableResponse),
        (status = 404, description = "Tracking file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state), err, ret(level = tracing::Level::TRACE))]
pub async fn get_tracking_table(
    State(state): State<AppState>,
    Query(query): Query<TableQueryParameters>,
) -> TrackingResult<Json<TrackingTableResponse>> {
    let format = query.format.unwrap_or(TableFormat::GeoJson);
    let mut stored = state.store.load().context(error::LoadSnafu)?;
    // Sort in the stored dialect, where sort keys resolve; then translate.
    state.manager.sort_rows(&mut stored);
    let mut table = state
        .manager
        .rename_columns(&stored, format, TableFormat::GeoJson);
    state.manager.enforce_types(&mut table, format);
    Ok(Json(TrackingTableResponse {
        format,
        columns: table.columns().to_vec(),
        total: table.len(),
        items: table.to_records(),
    }))
}

#[utoipa::path(
    post,
    operation_id = "updateTrackingTable",
    tags = ["tracking"],
    path = "/tracking/table",
    request_body = TrackingUpdatePayload,
    responses(
        (status = 200, description = "Successful Response", body = TrackingUpdateResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Tracking file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state, payload), err, ret(level = tracing::Level::TRACE))]
pub async fn post_tracking_table(
    State(state): State<AppState>,
    Json(payload): Json<TrackingUpdatePayload>,
) -> TrackingResult<Json<TrackingUpdateResponse>> {
    payload.validate().context(error::ValidationSnafu)?;

    let incoming = StatusTable::from_objects(payload.records);
    let mut table = state
        .manager
        .rename_columns(&incoming, TableFormat::GeoJson, payload.format);
    state.manager.enforce_types(&mut table, TableFormat::GeoJson);

    let outcome = state
        .store
        .apply_updates(
            &table.to_records(),
            &state.config.key_column,
            &state.config.timestamp_column,
        )
        .context(error::UpdateSnafu)?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    operation_id = "updateStatus",
    tags = ["tracking"],
    path = "/tracking/status",
    request_body = StatusUpdatePayload,
    responses(
        (status = 200, description = "Successful Response", body = StatusUpdateResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Tracking file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state), err, ret(level = tracing::Level::TRACE))]
pub async fn update_status(
    State(state): State<AppState>,
    Json(payload): Json<StatusUpdatePayload>,
) -> TrackingResult<Json<StatusUpdateResponse>> {
    payload.validate().context(error::ValidationSnafu)?;

    let updated = state
        .store
        .update_status_where(
            &payload.name_contains,
            &state.config.name_column,
            &payload.column,
            &payload.value,
        )
        .context(error::StatusSnafu)?;
    Ok(Json(StatusUpdateResponse { updated }))
}

#[utoipa::path(
    post,
    operation_id = "exportExcel",
    tags = ["tracking"],
    path = "/tracking/export/excel",
    responses(
        (status = 200, description = "Successful Response", body = ExportResponse),
        (status = 404, description = "Tracking file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state), err, ret(level = tracing::Level::TRACE))]
pub async fn export_excel(State(state): State<AppState>) -> TrackingResult<Json<ExportResponse>> {
    let mut stored = state.store.load().context(error::LoadSnafu)?;
    state.manager.sort_rows(&mut stored);
    let mut table = state
        .manager
        .rename_columns(&stored, TableFormat::Excel, TableFormat::GeoJson);
    state.manager.enforce_types(&mut table, TableFormat::Excel);

    let rows = write_excel(&table, &state.config.excel_path, &state.config.sheet_name)
        .context(error::ExportExcelSnafu)?;
    tracing::info!(
        path = %state.config.excel_path.display(),
        values_sheet = %values_sheet_name(&state.config.sheet_name),
        rows,
        "excel workbook exported"
    );
    Ok(Json(ExportResponse {
        path: state.config.excel_path.display().to_string(),
        rows,
    }))
}

#[utoipa::path(
    post,
    operation_id = "exportShapefile",
    tags = ["tracking"],
    path = "/tracking/export/shapefile",
    responses(
        (status = 200, description = "Successful Response", body = ExportResponse),
        (status = 404, description = "Tracking file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(level = "debug", skip(state), err, ret(level = tracing::Level::TRACE))]
pub async fn export_shapefile(
    State(state): State<AppState>,
) -> TrackingResult<Json<ExportResponse>> {
    let mut stored = state.store.load().context(error::LoadSnafu)?;
    state.manager.sort_rows(&mut stored);
    let mut table = state
        .manager
        .rename_columns(&stored, TableFormat::Shapefile, TableFormat::GeoJson);
    state.manager.enforce_types(&mut table, TableFormat::Shapefile);

    let rows = write_shapefile(&table, state.manager.metadata(), &state.config.shapefile_path)
        .context(error::ExportShapefileSnafu)?;
    Ok(Json(ExportResponse {
        path: state.config.shapefile_path.display().to_string(),
        rows,
    }))
}
