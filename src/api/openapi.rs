//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, cv, health, publications, taxonomy};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio Curator API",
        version = "0.3.0",
        description = "Administration API for a researcher's publication portfolio",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        authors::author_publications,
        authors::list_duplicates,
        authors::list_suspicious,
        authors::list_fragments,
        authors::merge_authors,
        // Publications
        publications::list_publications,
        publications::get_publication,
        publications::create_publication,
        publications::update_publication,
        publications::delete_publication,
        // Taxonomy
        taxonomy::list_keywords,
        taxonomy::create_keyword,
        taxonomy::delete_keyword,
        taxonomy::list_research_areas,
        taxonomy::create_research_area,
        taxonomy::delete_research_area,
        // CV
        cv::preview_cv,
        cv::import_cv,
    ),
    components(
        schemas(
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorWithCount,
            crate::models::author::LinkedAuthor,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::matching::DuplicateCandidate,
            crate::matching::SuspiciousAuthor,
            crate::matching::SuspicionReason,
            crate::matching::FragmentGroup,
            crate::matching::FragmentSuggestion,
            crate::services::merge::MergeRequest,
            crate::services::merge::MergeReport,
            crate::services::merge::MergedLink,
            // Publications
            crate::models::publication::Publication,
            crate::models::publication::PublicationDetails,
            crate::models::publication::PublicationType,
            crate::models::publication::PublicationStatus,
            crate::models::publication::AuthorLinkInput,
            crate::models::publication::CreatePublication,
            crate::models::publication::UpdatePublication,
            crate::models::publication::AuthoredPublication,
            crate::models::publication_author::PublicationAuthor,
            // Taxonomy
            crate::models::taxonomy::Keyword,
            crate::models::taxonomy::ResearchArea,
            crate::models::taxonomy::CreateKeyword,
            crate::models::taxonomy::CreateResearchArea,
            // CV
            crate::services::cv_import::CvImportRequest,
            crate::services::cv_import::CvPreview,
            crate::services::cv_import::ImportReport,
            crate::services::cv_import::ImportedPublication,
            crate::services::cv_import::FailedEntry,
            crate::cv::ImportPlan,
            crate::cv::MatchedEntry,
            crate::cv::CvEntry,
            crate::matching::ParsedName,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Authors, duplicate review and merging"),
        (name = "publications", description = "Publication management"),
        (name = "taxonomy", description = "Keywords and research areas"),
        (name = "cv", description = "CV import")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
