//! crates/househeroes_client/src/auth.rs
//!
//! Seams for the identity provider: where bearer tokens come from, and the
//! interactive sign-in the login screen drives.

use async_trait::async_trait;

use crate::error::ClientError;

/// Supplies the bearer token for outgoing requests. `None` sends the request
/// anonymously.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>, ClientError>;
}

/// A fixed token, for tests and scripts.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInResult {
    pub access_token: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Interactive sign-in against the identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` when the user cancelled.
    async fn sign_in(&self) -> Result<Option<SignInResult>, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    fn is_signed_in(&self) -> bool;

    fn display_name(&self) -> Option<String>;
}
