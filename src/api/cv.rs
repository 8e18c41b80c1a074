//! CV import API endpoints

use axum::{extract::State, Json};
use chrono::{Datelike, Utc};

use crate::{
    error::AppResult,
    services::cv_import::{CvImportRequest, CvPreview, ImportReport},
};

/// Parse a CV and show which entries are new. Nothing is written.
#[utoipa::path(
    post,
    path = "/cv/preview",
    tag = "cv",
    request_body = CvImportRequest,
    responses(
        (status = 200, description = "Import plan", body = CvPreview)
    )
)]
pub async fn preview_cv(
    State(state): State<crate::AppState>,
    Json(request): Json<CvImportRequest>,
) -> AppResult<Json<CvPreview>> {
    let year = request.default_year.unwrap_or_else(|| Utc::now().year());
    let preview = state.services.cv_import.preview(&request.text, year).await?;
    Ok(Json(preview))
}

/// Import the CV entries that are not yet in the database
#[utoipa::path(
    post,
    path = "/cv/import",
    tag = "cv",
    request_body = CvImportRequest,
    responses(
        (status = 200, description = "Import report", body = ImportReport)
    )
)]
pub async fn import_cv(
    State(state): State<crate::AppState>,
    Json(request): Json<CvImportRequest>,
) -> AppResult<Json<ImportReport>> {
    let year = request.default_year.unwrap_or_else(|| Utc::now().year());
    let report = state.services.cv_import.import(&request.text, year).await?;
    Ok(Json(report))
}
