use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Swagger UI location.
pub const DOCS_ROUTE: &str = "/docs";
/// Raw OpenAPI document location.
pub const OPENAPI_ROUTE: &str = "/api-doc/openapi.json";

/// Serve the Swagger UI for the REST surface and the relay payloads.
pub fn router(state: SharedState) -> Router<SharedState> {
    let ui: Router<SharedState> = SwaggerUi::new(DOCS_ROUTE)
        .url(OPENAPI_ROUTE, ApiDoc::openapi())
        .into();

    ui.with_state(state)
}
