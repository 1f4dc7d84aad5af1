use anyhow::Result;
use axum::Router;
use utoipa::openapi::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn create_swagger_ui<S>(openapi: OpenApi) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi);
    Ok(swagger_ui.into())
}
