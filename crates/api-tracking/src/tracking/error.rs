use axum::Json;
use axum::response::IntoResponse;
use core_export::ExportError;
use core_store::StoreError;
use http::StatusCode;
use snafu::Location;
use snafu::prelude::*;

use crate::error::ErrorResponse;
use crate::error::IntoStatusCode;

pub type TrackingResult<T> = Result<T, TrackingAPIError>;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum TrackingAPIError {
    #[snafu(display("Load tracking table error: {source}"))]
    Load {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Update tracking table error: {source}"))]
    Update {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Status update error: {source}"))]
    Status {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Excel export error: {source}"))]
    ExportExcel {
        source: ExportError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Shapefile export error: {source}"))]
    ExportShapefile {
        source: ExportError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Invalid payload: {source}"))]
    Validation {
        source: validator::ValidationErrors,
        #[snafu(implicit)]
        location: Location,
    },
}

// Select which status code to return.
impl IntoStatusCode for TrackingAPIError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Load { source, .. } => store_status_code(source),
            Self::Update { source, .. } | Self::Status { source, .. } => match &source {
                StoreError::KeyColumnMissing { .. } | StoreError::ColumnMissing { .. } => {
                    StatusCode::BAD_REQUEST
                }
                other => store_status_code(other),
            },
            Self::ExportExcel { .. } | Self::ExportShapefile { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

fn store_status_code(error: &StoreError) -> StatusCode {
    match error {
        StoreError::ReadTracking { source, .. }
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for TrackingAPIError {
    fn into_response(self) -> axum::response::Response {
        let code = self.status_code();
        let error = ErrorResponse {
            message: self.to_string(),
            status_code: code.as_u16(),
        };
        (code, Json(error)).into_response()
    }
}
