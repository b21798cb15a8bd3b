use drinks_api::{
    AccessGuard, AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{DrinkRepository, PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database, access guard and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging. RUST_LOG wins over the development default.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "drinks_api=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let postgres = PostgresRepository::new(pool);
    postgres
        .migrate()
        .await
        .expect("FATAL: Failed to run database migrations.");

    if config.reset_db {
        // Destroys every existing drink.
        let seed = postgres
            .reset_with_seed()
            .await
            .expect("FATAL: Failed to reset the drinks table.");
        tracing::warn!(id = seed.id, "RESET_DB set: drinks table wiped and reseeded");
    }

    let repo = Arc::new(postgres) as RepositoryState;

    // 4. Access guard, verifying against the issuer's published keys.
    let guard = AccessGuard::from_config(&config);
    tracing::info!(issuer = %config.issuer(), audience = %config.api_audience, "access guard configured");

    // 5. State, router, server.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        repo,
        guard,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the listen address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
