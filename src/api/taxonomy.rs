//! Keyword and research-area API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::taxonomy::{CreateKeyword, CreateResearchArea, Keyword, ResearchArea},
};

/// List keywords
#[utoipa::path(
    get,
    path = "/keywords",
    tag = "taxonomy",
    responses(
        (status = 200, description = "Keywords", body = Vec<Keyword>)
    )
)]
pub async fn list_keywords(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Keyword>>> {
    let keywords = state.services.taxonomy.list_keywords().await?;
    Ok(Json(keywords))
}

/// Create keyword
#[utoipa::path(
    post,
    path = "/keywords",
    tag = "taxonomy",
    request_body = CreateKeyword,
    responses(
        (status = 201, description = "Keyword created", body = Keyword),
        (status = 409, description = "Keyword already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_keyword(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateKeyword>,
) -> AppResult<(StatusCode, Json<Keyword>)> {
    let keyword = state.services.taxonomy.create_keyword(&data).await?;
    Ok((StatusCode::CREATED, Json(keyword)))
}

/// Delete keyword
#[utoipa::path(
    delete,
    path = "/keywords/{id}",
    tag = "taxonomy",
    params(("id" = i32, Path, description = "Keyword ID")),
    responses(
        (status = 204, description = "Keyword deleted"),
        (status = 404, description = "Keyword not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_keyword(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.taxonomy.delete_keyword(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List research areas
#[utoipa::path(
    get,
    path = "/research-areas",
    tag = "taxonomy",
    responses(
        (status = 200, description = "Research areas", body = Vec<ResearchArea>)
    )
)]
pub async fn list_research_areas(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<ResearchArea>>> {
    let areas = state.services.taxonomy.list_research_areas().await?;
    Ok(Json(areas))
}

/// Create research area
#[utoipa::path(
    post,
    path = "/research-areas",
    tag = "taxonomy",
    request_body = CreateResearchArea,
    responses(
        (status = 201, description = "Research area created", body = ResearchArea),
        (status = 409, description = "Research area already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_research_area(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateResearchArea>,
) -> AppResult<(StatusCode, Json<ResearchArea>)> {
    let area = state.services.taxonomy.create_research_area(&data).await?;
    Ok((StatusCode::CREATED, Json(area)))
}

/// Delete research area
#[utoipa::path(
    delete,
    path = "/research-areas/{id}",
    tag = "taxonomy",
    params(("id" = i32, Path, description = "Research area ID")),
    responses(
        (status = 204, description = "Research area deleted"),
        (status = 404, description = "Research area not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_research_area(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.taxonomy.delete_research_area(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
