//! Publication API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::publication::{
        CreatePublication, Publication, PublicationDetails, PublicationQuery, UpdatePublication,
    },
};

/// List publications
#[utoipa::path(
    get,
    path = "/publications",
    tag = "publications",
    params(PublicationQuery),
    responses(
        (status = 200, description = "Publications, newest first", body = Vec<Publication>)
    )
)]
pub async fn list_publications(
    State(state): State<crate::AppState>,
    Query(query): Query<PublicationQuery>,
) -> AppResult<Json<Vec<Publication>>> {
    let publications = state.services.publications.list(&query).await?;
    Ok(Json(publications))
}

/// Get publication with authors, keywords and research areas
#[utoipa::path(
    get,
    path = "/publications/{id}",
    tag = "publications",
    params(("id" = i32, Path, description = "Publication ID")),
    responses(
        (status = 200, description = "Publication details", body = PublicationDetails),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_publication(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PublicationDetails>> {
    let publication = state.services.publications.get_details(id).await?;
    Ok(Json(publication))
}

/// Create publication
#[utoipa::path(
    post,
    path = "/publications",
    tag = "publications",
    request_body = CreatePublication,
    responses(
        (status = 201, description = "Publication created", body = PublicationDetails),
        (status = 400, description = "Invalid publication", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_publication(
    State(state): State<crate::AppState>,
    Json(data): Json<CreatePublication>,
) -> AppResult<(StatusCode, Json<PublicationDetails>)> {
    let publication = state.services.publications.create(&data).await?;
    Ok((StatusCode::CREATED, Json(publication)))
}

/// Update publication
#[utoipa::path(
    put,
    path = "/publications/{id}",
    tag = "publications",
    params(("id" = i32, Path, description = "Publication ID")),
    request_body = UpdatePublication,
    responses(
        (status = 200, description = "Publication updated", body = PublicationDetails),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_publication(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePublication>,
) -> AppResult<Json<PublicationDetails>> {
    let publication = state.services.publications.update(id, &data).await?;
    Ok(Json(publication))
}

/// Delete publication and its links
#[utoipa::path(
    delete,
    path = "/publications/{id}",
    tag = "publications",
    params(("id" = i32, Path, description = "Publication ID")),
    responses(
        (status = 204, description = "Publication deleted"),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_publication(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.publications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
