//! services/api/src/web/graphql/mod.rs
//!
//! The GraphQL surface: schema assembly and the axum handlers serving it.

pub mod errors;
pub mod inputs;
pub mod mutation;
pub mod query;
pub mod resolvers;
pub mod types;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, Schema};
use axum::{
    extract::{Extension, State},
    response::{Html, Json},
};
use househeroes_core::claims::AuthContext;
use househeroes_core::clock::SharedClock;
use househeroes_core::identity::IdentityResolver;
use househeroes_core::ports::DatabaseService;
use househeroes_core::registration::RegistrationService;
use std::sync::Arc;

use crate::web::state::AppState;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

/// Deepest selection a single operation may nest.
pub const MAX_QUERY_DEPTH: usize = 10;
/// Upper bound on the summed field cost of a single operation.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

pub type HouseHeroesSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Services every resolver can reach through the schema data.
#[derive(Clone)]
pub struct ApiServices {
    pub db: Arc<dyn DatabaseService>,
    pub identity: IdentityResolver,
    pub registration: RegistrationService,
    pub clock: SharedClock,
}

impl ApiServices {
    pub fn new(db: Arc<dyn DatabaseService>, clock: SharedClock) -> Self {
        Self {
            identity: IdentityResolver::new(db.clone(), clock.clone()),
            registration: RegistrationService::new(db.clone(), clock.clone()),
            db,
            clock,
        }
    }
}

pub fn build_schema(services: ApiServices) -> HouseHeroesSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Executes one GraphQL operation with the caller's `AuthContext` attached.
pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request.data(auth)).await)
}

/// Serves the GraphiQL explorer.
pub async fn graphiql_handler() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
