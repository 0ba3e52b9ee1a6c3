use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Explore With Me Statistics API",
        version = "0.1.0",
        description = "Endpoint hit ingestion and view statistics"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_stats::handlers::ApiDoc::openapi());
        doc
    }
}
