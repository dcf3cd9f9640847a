//! crates/househeroes_client/src/view_models.rs
//!
//! Headless screen state for the mobile app. Each view-model owns one busy
//! flag; a command fired while it is set returns immediately without doing
//! anything. Failures surface as alerts or status text, never as errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::HouseHeroesApi;
use crate::auth::Authenticator;
use crate::operations::{Family, RegisterNewUser, Task};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//=========================================================================================
// Shared Pieces
//=========================================================================================

/// Set for as long as a command runs.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// `None` when another command already holds the flag.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the flag when dropped.
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn error(message: String) -> Self {
        Self {
            title: "Error".to_string(),
            message,
        }
    }
}

/// Where the app should go after a command succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The tabbed main screen.
    Main,
    /// First-run family setup.
    Welcome,
}

//=========================================================================================
// Families
//=========================================================================================

pub struct FamiliesViewModel {
    api: Arc<dyn HouseHeroesApi>,
    busy: BusyFlag,
    refreshing: AtomicBool,
    families: Mutex<Vec<Family>>,
    alerts: Mutex<Vec<Alert>>,
}

impl FamiliesViewModel {
    pub fn new(api: Arc<dyn HouseHeroesApi>) -> Self {
        Self {
            api,
            busy: BusyFlag::default(),
            refreshing: AtomicBool::new(false),
            families: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn title(&self) -> &'static str {
        "Families"
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub fn families(&self) -> Vec<Family> {
        lock(&self.families).clone()
    }

    /// Drains the alerts raised since the last call.
    pub fn take_alerts(&self) -> Vec<Alert> {
        std::mem::take(&mut *lock(&self.alerts))
    }

    pub async fn load_families(&self) {
        let Some(_busy) = self.busy.try_acquire() else {
            debug!("Families are already loading");
            return;
        };
        lock(&self.families).clear();

        match self.api.families().await {
            Ok(families) => *lock(&self.families) = families,
            Err(e) => {
                error!("Failed to load families: {}", e);
                lock(&self.alerts).push(Alert::error(format!("Unable to get families: {}", e)));
            }
        }
        self.refreshing.store(false, Ordering::Release);
    }

    /// Pull-to-refresh.
    pub async fn refresh(&self) {
        self.refreshing.store(true, Ordering::Release);
        self.load_families().await;
    }
}

//=========================================================================================
// Tasks
//=========================================================================================

pub struct TasksViewModel {
    api: Arc<dyn HouseHeroesApi>,
    busy: BusyFlag,
    refreshing: AtomicBool,
    tasks: Mutex<Vec<Task>>,
    alerts: Mutex<Vec<Alert>>,
}

impl TasksViewModel {
    pub fn new(api: Arc<dyn HouseHeroesApi>) -> Self {
        Self {
            api,
            busy: BusyFlag::default(),
            refreshing: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn title(&self) -> &'static str {
        "Tasks"
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.tasks).clone()
    }

    pub fn take_alerts(&self) -> Vec<Alert> {
        std::mem::take(&mut *lock(&self.alerts))
    }

    pub async fn load_tasks(&self) {
        let Some(_busy) = self.busy.try_acquire() else {
            debug!("Tasks are already loading");
            return;
        };
        self.reload().await;
    }

    pub async fn refresh(&self) {
        self.refreshing.store(true, Ordering::Release);
        self.load_tasks().await;
    }

    /// Marks the task complete, then reloads the list under the same busy
    /// flag.
    pub async fn complete_task(&self, task_id: Uuid) {
        let Some(_busy) = self.busy.try_acquire() else {
            debug!("Ignoring completion of {} while busy", task_id);
            return;
        };
        match self.api.complete_task(task_id).await {
            Ok(task) => {
                info!("Completed task {}", task.id);
                self.reload().await;
            }
            Err(e) => {
                error!("Failed to complete task {}: {}", task_id, e);
                lock(&self.alerts).push(Alert::error(format!("Unable to complete task: {}", e)));
            }
        }
    }

    async fn reload(&self) {
        lock(&self.tasks).clear();
        match self.api.tasks().await {
            Ok(tasks) => *lock(&self.tasks) = tasks,
            Err(e) => {
                error!("Failed to load tasks: {}", e);
                lock(&self.alerts).push(Alert::error(format!("Unable to get tasks: {}", e)));
            }
        }
        self.refreshing.store(false, Ordering::Release);
    }
}

//=========================================================================================
// Welcome (first-run setup)
//=========================================================================================

pub struct WelcomeViewModel {
    api: Arc<dyn HouseHeroesApi>,
    busy: BusyFlag,
    welcome_message: String,
    status_message: Mutex<String>,
}

impl WelcomeViewModel {
    pub fn new(api: Arc<dyn HouseHeroesApi>, authenticator: &dyn Authenticator) -> Self {
        let name = authenticator
            .display_name()
            .unwrap_or_else(|| "there".to_string());
        Self {
            api,
            busy: BusyFlag::default(),
            welcome_message: format!(
                "Hi {}! Let's get you set up with your family's task management.",
                name
            ),
            status_message: Mutex::new(String::new()),
        }
    }

    pub fn welcome_message(&self) -> &str {
        &self.welcome_message
    }

    pub fn status_message(&self) -> String {
        lock(&self.status_message).clone()
    }

    pub fn is_processing(&self) -> bool {
        self.busy.is_set()
    }

    fn set_status(&self, message: impl Into<String>) {
        *lock(&self.status_message) = message.into();
    }

    /// Registers the signed-in user as the guardian of a new family.
    pub async fn create_family(&self, family_name: &str) -> Option<Navigation> {
        let family_name = family_name.trim();
        if family_name.is_empty() {
            self.set_status("Please enter a family name.");
            return None;
        }
        let _busy = self.busy.try_acquire()?;
        self.set_status("Creating your family...");

        let input = RegisterNewUser {
            create_new_family: true,
            family_name: Some(family_name.to_string()),
            existing_family_id: None,
        };
        self.register(input, "Family created successfully!", "Error creating family")
            .await
    }

    /// Joins an existing family; the invitation code is the family id.
    pub async fn join_family(&self, invitation_code: &str) -> Option<Navigation> {
        let invitation_code = invitation_code.trim();
        if invitation_code.is_empty() {
            self.set_status("Please enter a family invitation code.");
            return None;
        }
        let _busy = self.busy.try_acquire()?;
        self.set_status("Joining family...");

        let family_id = match Uuid::parse_str(invitation_code) {
            Ok(id) => id,
            Err(_) => {
                self.set_status("Error joining family: the invitation code is not valid");
                return None;
            }
        };
        let input = RegisterNewUser {
            create_new_family: false,
            family_name: None,
            existing_family_id: Some(family_id),
        };
        self.register(input, "Successfully joined family!", "Error joining family")
            .await
    }

    /// Leaves setup for later. No account is created until the user picks a
    /// family.
    pub fn skip_setup(&self) -> Navigation {
        Navigation::Main
    }

    async fn register(
        &self,
        input: RegisterNewUser,
        success_status: &str,
        error_prefix: &str,
    ) -> Option<Navigation> {
        match self.api.register_new_user(input).await {
            Ok(outcome) if outcome.success => {
                info!("Registration complete");
                self.set_status(success_status);
                Some(Navigation::Main)
            }
            Ok(outcome) => {
                self.set_status(format!("{}: {}", error_prefix, outcome.message));
                None
            }
            Err(e) => {
                error!("Registration failed: {}", e);
                self.set_status(format!("{}: {}", error_prefix, e));
                None
            }
        }
    }
}

//=========================================================================================
// Login
//=========================================================================================

pub struct LoginViewModel {
    authenticator: Arc<dyn Authenticator>,
    api: Arc<dyn HouseHeroesApi>,
    busy: BusyFlag,
    state: Mutex<LoginState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub is_signed_in: bool,
    pub user_display_name: String,
    pub status_message: String,
}

impl LoginViewModel {
    pub fn new(authenticator: Arc<dyn Authenticator>, api: Arc<dyn HouseHeroesApi>) -> Self {
        let view_model = Self {
            authenticator,
            api,
            busy: BusyFlag::default(),
            state: Mutex::new(LoginState::default()),
        };
        view_model.refresh_state();
        view_model
    }

    pub fn state(&self) -> LoginState {
        lock(&self.state).clone()
    }

    pub fn is_signing_in(&self) -> bool {
        self.busy.is_set()
    }

    /// Re-reads the authenticator. Call when the sign-in state changes
    /// outside this screen.
    pub fn refresh_state(&self) {
        let is_signed_in = self.authenticator.is_signed_in();
        let name = self
            .authenticator
            .display_name()
            .unwrap_or_else(|| "Unknown User".to_string());
        let mut state = lock(&self.state);
        state.is_signed_in = is_signed_in;
        if is_signed_in {
            state.status_message = format!("Welcome, {}!", name);
        }
        state.user_display_name = name;
    }

    fn set_status(&self, message: impl Into<String>) {
        lock(&self.state).status_message = message.into();
    }

    /// Runs the interactive sign-in. Users who already belong to a family go
    /// to the main screen; everyone else goes through setup.
    pub async fn sign_in(&self) -> Option<Navigation> {
        let _busy = self.busy.try_acquire()?;
        self.set_status("Signing in...");

        match self.authenticator.sign_in().await {
            Ok(Some(_)) => {
                self.set_status("Signed in successfully!");
                self.refresh_state();
                Some(self.landing_screen().await)
            }
            Ok(None) => {
                self.set_status("Sign in was cancelled or failed.");
                None
            }
            Err(e) => {
                error!("Sign in error: {}", e);
                self.set_status(format!("Sign in failed: {}", e));
                None
            }
        }
    }

    pub async fn sign_out(&self) {
        match self.authenticator.sign_out().await {
            Ok(()) => {
                self.set_status("Signed out successfully.");
                self.refresh_state();
            }
            Err(e) => {
                error!("Sign out error: {}", e);
                self.set_status(format!("Sign out failed: {}", e));
            }
        }
    }

    async fn landing_screen(&self) -> Navigation {
        match self.api.current_user().await {
            Ok(Some(user)) if user.family_id.is_some() => Navigation::Main,
            Ok(_) => Navigation::Welcome,
            Err(e) => {
                debug!("Could not look up the signed-in user: {}", e);
                Navigation::Main
            }
        }
    }
}
