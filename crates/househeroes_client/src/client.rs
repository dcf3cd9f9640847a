//! crates/househeroes_client/src/client.rs
//!
//! Sends named operations to the GraphQL endpoint with the caller's bearer token.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::TokenProvider;
use crate::error::{ClientError, GraphQlErrorMessage};
use crate::operations::Operation;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    operation_name: &'a str,
    variables: V,
}

/// The standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorMessage>,
}

impl<T> GraphQlResponse<T> {
    /// Any reported error fails the whole operation.
    pub fn into_result(self) -> Result<T, ClientError> {
        if !self.errors.is_empty() {
            return Err(ClientError::GraphQl(self.errors));
        }
        self.data.ok_or(ClientError::MissingData)
    }
}

#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GraphQlClient {
    /// `endpoint` is the full GraphQL URL, e.g. `http://localhost:3000/graphql`.
    pub fn new(endpoint: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_http_client(reqwest::Client::new(), endpoint, tokens)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            tokens,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Executes `operation` and decodes its `data` into `T`.
    pub async fn execute<V, T>(&self, operation: &Operation, variables: V) -> Result<T, ClientError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest {
            query: operation.document,
            operation_name: operation.name,
            variables,
        };
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = self.tokens.access_token().await? {
            request = request.bearer_auth(token);
        }

        debug!("Sending {}", operation.name);
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} failed with status {}", operation.name, status);
            return Err(ClientError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        let envelope: GraphQlResponse<T> = serde_json::from_slice(&bytes)?;
        envelope.into_result()
    }
}
