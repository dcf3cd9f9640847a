//! crates/househeroes_core/src/registration.rs
//!
//! First-time registration: an authenticated caller without an application
//! account either creates a family (and becomes its Guardian) or joins an
//! existing one (as a Child).
//!
//! The flow moves through three states. `Unregistered` is checked by looking
//! the caller up; `FamilyResolved` is the outcome of `resolve_family`; the
//! caller is `Registered` once the user (and any new family) is persisted.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::claims::AuthContext;
use crate::clock::SharedClock;
use crate::domain::{Family, NewUser, User, UserRole};
use crate::identity::IdentityResolver;
use crate::ports::{DatabaseService, PortError, PortResult};

pub const ALREADY_REGISTERED: &str = "User already registered";
pub const FAMILY_NOT_FOUND: &str = "Family not found";
pub const NO_FAMILY_CHOICE: &str = "You must either create a new family or join an existing one";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";

/// What the caller wants to do about their family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterNewUserRequest {
    pub create_new_family: bool,
    pub family_name: Option<String>,
    pub existing_family_id: Option<Uuid>,
}

/// Result reported back to the caller. Business-rule failures are carried here
/// rather than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub message: String,
    pub user: Option<User>,
    pub family: Option<Family>,
}

impl RegistrationOutcome {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            user: None,
            family: None,
        }
    }
}

/// A family the new user will belong to, and the role they get in it.
struct ResolvedFamily {
    family: Family,
    is_new: bool,
    role: UserRole,
}

#[derive(Clone)]
pub struct RegistrationService {
    db: Arc<dyn DatabaseService>,
    identity: IdentityResolver,
    clock: SharedClock,
}

impl RegistrationService {
    pub fn new(db: Arc<dyn DatabaseService>, clock: SharedClock) -> Self {
        let identity = IdentityResolver::new(db.clone(), clock.clone());
        Self { db, identity, clock }
    }

    pub async fn register_new_user(
        &self,
        auth: &AuthContext,
        request: RegisterNewUserRequest,
    ) -> PortResult<RegistrationOutcome> {
        let claims = auth.require_claims()?;

        if let Some(existing) = self.identity.get_current_user(auth).await? {
            warn!("Registration attempted by existing user {}", existing.id);
            return Ok(RegistrationOutcome::failure(ALREADY_REGISTERED));
        }

        let resolved = match self.resolve_family(&request, claims.last_name()).await? {
            Ok(resolved) => resolved,
            Err(message) => return Ok(RegistrationOutcome::failure(message)),
        };

        let now = self.clock.utc();
        let mut user = User::new(
            NewUser {
                external_id: claims.external_id()?.to_string(),
                email: claims.email()?.to_string(),
                first_name: claims.first_name().to_string(),
                last_name: claims.last_name().to_string(),
                role: resolved.role,
                family_id: Some(resolved.family.id),
            },
            now,
        )?;
        user.last_login_at = Some(now);

        let new_family = resolved.is_new.then(|| resolved.family.clone());
        let user = self.db.insert_registration(new_family, user).await?;
        info!(
            "Registered user {} as {} of family {}",
            user.id, user.role, resolved.family.id
        );

        Ok(RegistrationOutcome {
            success: true,
            message: REGISTRATION_SUCCESSFUL.to_string(),
            user: Some(user),
            family: Some(resolved.family),
        })
    }

    /// Creating a family wins when both options are supplied.
    async fn resolve_family(
        &self,
        request: &RegisterNewUserRequest,
        last_name: &str,
    ) -> PortResult<Result<ResolvedFamily, &'static str>> {
        if request.create_new_family {
            let name = match request.family_name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => default_family_name(last_name),
            };
            let family = Family::new(&name, self.clock.utc())?;
            return Ok(Ok(ResolvedFamily {
                family,
                is_new: true,
                role: UserRole::Guardian,
            }));
        }

        let Some(family_id) = request.existing_family_id else {
            return Ok(Err(NO_FAMILY_CHOICE));
        };

        match self.db.get_family_by_id(family_id).await {
            Ok(family) => Ok(Ok(ResolvedFamily {
                family,
                is_new: false,
                role: UserRole::Child,
            })),
            Err(PortError::NotFound(_)) => Ok(Err(FAMILY_NOT_FOUND)),
            Err(e) => Err(e),
        }
    }
}

fn default_family_name(last_name: &str) -> String {
    if last_name.is_empty() {
        "My Family".to_string()
    } else {
        format!("The {last_name} Family")
    }
}
