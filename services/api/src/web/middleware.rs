//! services/api/src/web/middleware.rs
//!
//! Resolves the caller's identity for every request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use househeroes_core::claims::AuthContext;
use std::sync::Arc;
use tracing::warn;

use crate::web::auth::bearer_token;
use crate::web::state::AppState;

/// Middleware that turns the bearer token into an `AuthContext`.
///
/// A valid token yields `Authenticated`; a missing or invalid token yields
/// `Anonymous`. The request always proceeds,
/// guarded operations decide for themselves. The context is inserted into the
/// request extensions for handlers to use.
pub async fn resolve_auth_context(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth = match bearer_token(req.headers()) {
        None => AuthContext::Anonymous,
        Some(token) => match state.verifier.verify(token) {
            Ok(claims) => AuthContext::Authenticated(claims),
            Err(e) => {
                warn!("Rejected bearer token: {}", e);
                AuthContext::Anonymous
            }
        },
    };

    req.extensions_mut().insert(auth);
    next.run(req).await
}
