//! crates/househeroes_core/src/clock.rs
//!
//! Time sources. Services take a `SharedClock` so tests can pin "now".

use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Shared, injectable source of the current time.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
