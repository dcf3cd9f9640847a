//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use househeroes_core::clock::SharedClock;
use househeroes_core::ports::DatabaseService;
use std::sync::Arc;

use crate::web::auth::TokenVerifier;
use crate::web::graphql::{build_schema, ApiServices, HouseHeroesSchema};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub verifier: Arc<TokenVerifier>,
    pub schema: HouseHeroesSchema,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseService>, verifier: TokenVerifier, clock: SharedClock) -> Self {
        Self {
            schema: build_schema(ApiServices::new(db.clone(), clock)),
            verifier: Arc::new(verifier),
            db,
        }
    }
}
