//! services/api/src/web/graphql/errors.rs
//!
//! Translation of port errors into GraphQL errors, and the authentication guard.

use async_graphql::{Context, ErrorExtensions, Guard, Result as GqlResult};
use househeroes_core::claims::AuthContext;
use househeroes_core::ports::{PortError, PortResult};
use tracing::error;

static ANONYMOUS: AuthContext = AuthContext::Anonymous;

/// Converts a `PortError` into a GraphQL error carrying a `code` extension.
/// Unexpected errors are logged and reported without detail.
pub fn port_error(err: PortError) -> async_graphql::Error {
    let (code, message) = match err {
        PortError::NotFound(msg) => ("NOT_FOUND", msg),
        PortError::Conflict(msg) => ("CONFLICT", msg),
        PortError::Validation(msg) => ("VALIDATION", msg),
        PortError::Unauthorized => ("UNAUTHORIZED", "Authentication required".to_string()),
        PortError::Unexpected(msg) => {
            error!("Unexpected error while resolving: {}", msg);
            ("INTERNAL", "An internal error occurred".to_string())
        }
    };
    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

pub trait IntoGraphQl<T> {
    fn into_gql(self) -> GqlResult<T>;
}

impl<T> IntoGraphQl<T> for PortResult<T> {
    fn into_gql(self) -> GqlResult<T> {
        self.map_err(port_error)
    }
}

/// The caller's context for this operation; anonymous when none was attached.
pub fn auth_context<'a>(ctx: &Context<'a>) -> &'a AuthContext {
    ctx.data_opt::<AuthContext>().unwrap_or(&ANONYMOUS)
}

/// Rejects anonymous callers with an `UNAUTHORIZED` error.
pub struct RequireAuth;

impl Guard for RequireAuth {
    async fn check(&self, ctx: &Context<'_>) -> GqlResult<()> {
        if auth_context(ctx).is_authenticated() {
            Ok(())
        } else {
            Err(port_error(PortError::Unauthorized))
        }
    }
}
