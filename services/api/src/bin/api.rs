//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::{Config, DatabaseBackend},
    error::ApiError,
    web::{self, auth::TokenVerifier, state::AppState},
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use househeroes_core::{
    clock::SharedClock, memory::InMemoryDatabase, ports::DatabaseService, seed::seed_database,
    SeedOutcome,
};
use mockable::DefaultClock;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Store & Run Migrations ---
    let db: Arc<dyn DatabaseService> = match config.database_backend {
        DatabaseBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ApiError::Internal("DATABASE_URL is required".to_string()))?;
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory store; data will not survive a restart.");
            Arc::new(InMemoryDatabase::new())
        }
    };
    let clock: SharedClock = Arc::new(DefaultClock);

    // --- 3. Seed Sample Data in Development ---
    if config.is_development() {
        match seed_database(db.as_ref(), &clock).await? {
            SeedOutcome::AlreadySeeded => info!("Sample data already present; skipping seed."),
            SeedOutcome::Seeded { families, users, tasks, assignments } => info!(
                "Seeded {} families, {} users, {} tasks and {} assignments.",
                families, users, tasks, assignments
            ),
        }
    }

    // --- 4. Load Token Signing Keys & Build the Shared AppState ---
    let verifier = TokenVerifier::from_config(&config.auth).await?;
    let app_state = Arc::new(AppState::new(db, verifier, clock));

    // --- 5. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    let cors = match &config.cors_allowed_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|e| {
                ApiError::Internal(format!("Invalid CORS_ALLOWED_ORIGIN '{}': {}", origin, e))
            })?;
            cors.allow_origin(origin).allow_credentials(true)
        }
        None => cors.allow_origin(Any),
    };
    let app = web::router(app_state).layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!("GraphQL endpoint at http://{}/graphql", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
