pub mod claims;
pub mod clock;
pub mod domain;
pub mod identity;
pub mod memory;
pub mod ports;
pub mod query;
pub mod registration;
pub mod seed;

pub use claims::{AuthContext, IdentityClaims};
pub use clock::{FixedClock, SharedClock};
pub use domain::{DomainError, Family, NewTask, NewUser, Task, TaskAssignment, User, UserRole};
pub use identity::IdentityResolver;
pub use memory::InMemoryDatabase;
pub use ports::{Dataset, DatabaseService, PortError, PortResult};
pub use registration::{RegisterNewUserRequest, RegistrationOutcome, RegistrationService};
pub use seed::{seed_database, SeedOutcome};
