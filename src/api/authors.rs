//! Author API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    matching::{DuplicateCandidate, FragmentGroup, SuspiciousAuthor},
    models::{
        author::{Author, AuthorWithCount, CreateAuthor, UpdateAuthor},
        publication::AuthoredPublication,
    },
    services::merge::{MergeReport, MergeRequest},
};

/// List all authors with publication counts
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Authors, owner first", body = Vec<AuthorWithCount>)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<AuthorWithCount>>> {
    let authors = state.services.authors.list().await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.get_by_id(id).await?;
    Ok(Json(author))
}

/// Create author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid author", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.authors.create(&data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.update(id, &data).await?;
    Ok(Json(author))
}

/// Delete author. Refused while the author has publication links.
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Author still has publications", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publications of an author
#[utoipa::path(
    get,
    path = "/authors/{id}/publications",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Linked publications", body = Vec<AuthoredPublication>),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_publications(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<AuthoredPublication>>> {
    let publications = state.services.authors.publications(id).await?;
    Ok(Json(publications))
}

/// Potential duplicate author pairs, best first
#[utoipa::path(
    get,
    path = "/authors/duplicates",
    tag = "authors",
    responses(
        (status = 200, description = "Duplicate candidates", body = Vec<DuplicateCandidate>)
    )
)]
pub async fn list_duplicates(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<DuplicateCandidate>>> {
    let duplicates = state.services.authors.duplicates().await?;
    Ok(Json(duplicates))
}

/// Author rows that are probably not people
#[utoipa::path(
    get,
    path = "/authors/suspicious",
    tag = "authors",
    responses(
        (status = 200, description = "Suspicious authors", body = Vec<SuspiciousAuthor>)
    )
)]
pub async fn list_suspicious(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<SuspiciousAuthor>>> {
    let suspicious = state.services.authors.suspicious().await?;
    Ok(Json(suspicious))
}

/// Initial-only and surname-only authors with merge suggestions
#[utoipa::path(
    get,
    path = "/authors/fragments",
    tag = "authors",
    responses(
        (status = 200, description = "Fragments grouped by last name", body = Vec<FragmentGroup>)
    )
)]
pub async fn list_fragments(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<FragmentGroup>>> {
    let fragments = state.services.authors.fragments().await?;
    Ok(Json(fragments))
}

/// Merge the secondary author into the primary
#[utoipa::path(
    post,
    path = "/authors/merge",
    tag = "authors",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Merge committed", body = MergeReport),
        (status = 400, description = "Same author on both sides", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn merge_authors(
    State(state): State<crate::AppState>,
    Json(request): Json<MergeRequest>,
) -> AppResult<Json<MergeReport>> {
    let report = state
        .services
        .authors
        .merge(request.primary_id, request.secondary_id)
        .await?;
    Ok(Json(report))
}
