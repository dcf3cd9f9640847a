pub mod auth;
pub mod graphql;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::resolve_auth_context;
pub use rest::{health_handler, list_tasks_handler};

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::graphql::{graphiql_handler, graphql_handler};
use crate::web::rest::ApiDoc;
use crate::web::state::AppState;

/// Builds the complete application router.
///
/// Every API route runs behind `resolve_auth_context`, so handlers always find
/// an `AuthContext` in the request extensions.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/api/tasks", get(list_tasks_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            resolve_auth_context,
        ))
        .route("/health", get(health_handler))
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
