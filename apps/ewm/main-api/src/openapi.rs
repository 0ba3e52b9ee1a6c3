use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Explore With Me API",
        version = "0.1.0",
        description = "Events, participation requests, categories, compilations and users"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

/// Base document with every domain's paths merged in.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_categories::handlers::ApiDoc::openapi());
        doc.merge(domain_users::handlers::ApiDoc::openapi());
        doc.merge(domain_events::handlers::ApiDoc::openapi());
        doc.merge(domain_compilations::handlers::ApiDoc::openapi());
        doc
    }
}
