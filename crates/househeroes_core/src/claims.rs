//! crates/househeroes_core/src/claims.rs
//!
//! Identity-provider claims and the per-request authentication context.
//! The context is passed explicitly to every operation that needs to know
//! who is calling; nothing here is stored in ambient or thread-local state.

use serde::{Deserialize, Serialize};

use crate::ports::{PortError, PortResult};

/// The subset of a verified token's claims the application cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Entra object id, used when `sub` is absent.
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl IdentityClaims {
    /// The identity-provider subject, `sub` first, then `oid`.
    pub fn external_id(&self) -> PortResult<&str> {
        non_blank(&self.sub)
            .or_else(|| non_blank(&self.oid))
            .ok_or_else(|| PortError::Validation("User ID not found in claims".to_string()))
    }

    pub fn email(&self) -> PortResult<&str> {
        non_blank(&self.email)
            .ok_or_else(|| PortError::Validation("Email not found in claims".to_string()))
    }

    pub fn first_name(&self) -> &str {
        non_blank(&self.given_name).unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        non_blank(&self.family_name).unwrap_or_default()
    }
}

/// Who is making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    #[default]
    Anonymous,
    Authenticated(IdentityClaims),
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn claims(&self) -> Option<&IdentityClaims> {
        match self {
            Self::Authenticated(claims) => Some(claims),
            Self::Anonymous => None,
        }
    }

    /// The claims, or `Unauthorized` for anonymous callers.
    pub fn require_claims(&self) -> PortResult<&IdentityClaims> {
        self.claims().ok_or(PortError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_prefers_sub_then_oid() {
        let claims = IdentityClaims {
            sub: Some("sub-1".into()),
            oid: Some("oid-1".into()),
            ..Default::default()
        };
        assert_eq!(claims.external_id(), Ok("sub-1"));

        let claims = IdentityClaims {
            sub: Some("  ".into()),
            oid: Some("oid-1".into()),
            ..Default::default()
        };
        assert_eq!(claims.external_id(), Ok("oid-1"));
    }

    #[test]
    fn missing_subject_or_email_is_a_validation_error() {
        let claims = IdentityClaims::default();
        assert!(matches!(claims.external_id(), Err(PortError::Validation(_))));
        assert!(matches!(claims.email(), Err(PortError::Validation(_))));
    }

    #[test]
    fn names_default_to_empty() {
        let claims = IdentityClaims::default();
        assert_eq!(claims.first_name(), "");
        assert_eq!(claims.last_name(), "");
    }

    #[test]
    fn anonymous_context_has_no_claims() {
        let ctx = AuthContext::Anonymous;
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.require_claims(), Err(PortError::Unauthorized));
    }
}
