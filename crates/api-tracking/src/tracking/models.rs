use core_schema::TableFormat;
use core_store::UpdateOutcome;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableQueryParameters {
    /// Dialect to return the table in; defaults to geojson.
    #[serde(default)]
    pub format: Option<TableFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingTableResponse {
    #[schema(value_type = String)]
    pub format: TableFormat,
    pub columns: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Map<String, Value>>,
    pub total: usize,
}

/// Whole-row record snapshots in some dialect. Rows are matched to stored
/// rows by the configured key column after translation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdatePayload {
    #[schema(value_type = String)]
    pub format: TableFormat,
    #[validate(length(min = 1, message = "records must not be empty"))]
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdateResponse {
    pub updated: usize,
    pub skipped: usize,
    pub total: usize,
}

impl From<UpdateOutcome> for TrackingUpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            updated: outcome.updated,
            skipped: outcome.skipped,
            total: outcome.total,
        }
    }
}

/// Batch edit: set `column` to `value` on every row whose name contains any
/// of the given substrings. Column names are in the GeoJSON dialect.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatePayload {
    #[validate(length(min = 1, message = "nameContains must not be empty"))]
    pub name_contains: Vec<String>,
    #[validate(length(min = 1, message = "column must not be empty"))]
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: String,
    pub rows: usize,
}
