//! crates/househeroes_client/src/error.rs

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct GraphQlErrorMessage {
    pub message: String,
    /// The server's `extensions.code`, when present.
    #[serde(default, deserialize_with = "code_from_extensions", rename = "extensions")]
    pub code: Option<String>,
}

fn code_from_extensions<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let extensions: Option<serde_json::Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(extensions
        .as_ref()
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .map(str::to_string))
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server responded with status {0}")]
    Status(u16),
    #[error("{}", join_messages(.0))]
    GraphQl(Vec<GraphQlErrorMessage>),
    #[error("Failed to decode the response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("The response carried no data")]
    MissingData,
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl ClientError {
    /// The first GraphQL error code, e.g. `UNAUTHORIZED`.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::GraphQl(errors) => errors.iter().find_map(|e| e.code.as_deref()),
            _ => None,
        }
    }
}

fn join_messages(errors: &[GraphQlErrorMessage]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
