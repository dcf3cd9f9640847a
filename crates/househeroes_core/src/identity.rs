//! crates/househeroes_core/src/identity.rs
//!
//! Maps an authenticated caller's claims to an application `User`,
//! provisioning one on first sight.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::claims::AuthContext;
use crate::clock::SharedClock;
use crate::domain::{NewUser, User, UserRole};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Clone)]
pub struct IdentityResolver {
    db: Arc<dyn DatabaseService>,
    clock: SharedClock,
}

impl IdentityResolver {
    pub fn new(db: Arc<dyn DatabaseService>, clock: SharedClock) -> Self {
        Self { db, clock }
    }

    /// Looks up the caller's user. `None` for anonymous callers or unknown subjects.
    pub async fn get_current_user(&self, auth: &AuthContext) -> PortResult<Option<User>> {
        let Some(claims) = auth.claims() else {
            return Ok(None);
        };
        let external_id = claims.external_id()?;
        self.db.find_user_by_external_id(external_id).await
    }

    /// Returns the caller's user, creating a family-less `Child` if none exists.
    /// Existing users get their `last_login_at` refreshed.
    pub async fn get_or_create_user(&self, auth: &AuthContext) -> PortResult<User> {
        let claims = auth.require_claims()?;

        if let Some(mut existing) = self.get_current_user(auth).await? {
            let now = self.clock.utc();
            self.db.update_last_login(&existing.external_id, now).await?;
            existing.last_login_at = Some(now);
            debug!("Refreshed last login for user {}", existing.id);
            return Ok(existing);
        }

        let now = self.clock.utc();
        let mut user = User::new(
            NewUser {
                external_id: claims.external_id()?.to_string(),
                email: claims.email()?.to_string(),
                first_name: claims.first_name().to_string(),
                last_name: claims.last_name().to_string(),
                role: UserRole::Child,
                family_id: None,
            },
            now,
        )?;
        user.last_login_at = Some(now);

        let user = self.db.insert_user(user).await?;
        info!("Provisioned user {} for a first-time sign-in", user.id);
        Ok(user)
    }

    /// The user's family, or `None` when the user is unknown or has no family yet.
    pub async fn get_user_family_id(&self, user_id: Uuid) -> PortResult<Option<Uuid>> {
        match self.db.get_user_by_id(user_id).await {
            Ok(user) => Ok(user.family_id),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stamps `last_login_at`; silently does nothing for unknown subjects.
    pub async fn update_last_login(&self, external_id: &str) -> PortResult<()> {
        let touched = self.db.update_last_login(external_id, self.clock.utc()).await?;
        if !touched {
            debug!("No user to stamp a login for");
        }
        Ok(())
    }

    /// The caller's family, resolved through their user record.
    pub async fn current_family_id(&self, auth: &AuthContext) -> PortResult<Option<Uuid>> {
        match self.get_current_user(auth).await? {
            Some(user) => self.get_user_family_id(user.id).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::IdentityClaims;
    use crate::clock::FixedClock;
    use crate::memory::InMemoryDatabase;
    use chrono::{TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    fn signed_in(sub: &str) -> AuthContext {
        AuthContext::Authenticated(IdentityClaims {
            sub: Some(sub.to_string()),
            email: Some(format!("{sub}@example.com")),
            given_name: Some("Sam".to_string()),
            family_name: Some("Smith".to_string()),
            ..Default::default()
        })
    }

    #[fixture]
    fn resolver() -> IdentityResolver {
        IdentityResolver::new(Arc::new(InMemoryDatabase::new()), Arc::new(DefaultClock))
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_caller_has_no_current_user(resolver: IdentityResolver) {
        let user = resolver.get_current_user(&AuthContext::Anonymous).await.unwrap();
        assert_eq!(user, None);
    }

    #[rstest]
    #[tokio::test]
    async fn first_sign_in_provisions_a_familyless_child(resolver: IdentityResolver) {
        let user = resolver.get_or_create_user(&signed_in("abc")).await.unwrap();

        assert_eq!(user.external_id, "abc");
        assert_eq!(user.email, "abc@example.com");
        assert_eq!(user.first_name, "Sam");
        assert_eq!(user.role, UserRole::Child);
        assert_eq!(user.family_id, None);
        assert!(user.last_login_at.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_sign_in_returns_the_same_user(resolver: IdentityResolver) {
        let first = resolver.get_or_create_user(&signed_in("abc")).await.unwrap();
        let second = resolver.get_or_create_user(&signed_in("abc")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.last_login_at >= first.last_login_at);
    }

    #[tokio::test]
    async fn fixed_clock_keeps_last_login_stable() {
        let at = Utc.with_ymd_and_hms(2025, 8, 22, 12, 0, 0).unwrap();
        let db = Arc::new(InMemoryDatabase::new());
        let resolver = IdentityResolver::new(db.clone(), Arc::new(FixedClock(at)));

        let first = resolver.get_or_create_user(&signed_in("abc")).await.unwrap();
        let second = resolver.get_or_create_user(&signed_in("abc")).await.unwrap();

        assert_eq!(first.last_login_at, Some(at));
        assert_eq!(second.last_login_at, Some(at));
        let stored = db.get_user_by_id(first.id).await.unwrap();
        assert_eq!(stored.last_login_at, Some(at));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_email_is_a_hard_failure(resolver: IdentityResolver) {
        let auth = AuthContext::Authenticated(IdentityClaims {
            sub: Some("abc".to_string()),
            ..Default::default()
        });
        let result = resolver.get_or_create_user(&auth).await;
        assert!(matches!(result, Err(PortError::Validation(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_has_no_family(resolver: IdentityResolver) {
        let family = resolver.get_user_family_id(Uuid::new_v4()).await.unwrap();
        assert_eq!(family, None);
    }

    #[rstest]
    #[tokio::test]
    async fn update_last_login_ignores_unknown_subjects(resolver: IdentityResolver) {
        resolver.update_last_login("nobody").await.unwrap();
    }
}
