use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{
    build_state,
    config::{SessionBackend, Settings},
    create_router, database,
    repositories::PgCredentialStore,
    session::{MemorySessionStore, RedisSessionStore, SessionStore, SessionSweeper},
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let settings = Settings::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::migrate(&pool).await?;

    let session_store: Arc<dyn SessionStore> = match settings.session.backend {
        SessionBackend::Memory => {
            info!("Using in-memory session store");
            Arc::new(MemorySessionStore::new())
        }
        SessionBackend::Redis => {
            let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
            match redis_pool.health_check().await {
                Ok(true) => info!("Redis connection successful"),
                _ => warn!("Redis is not reachable yet; sessions will fail until it is"),
            }
            Arc::new(RedisSessionStore::new(redis_pool))
        }
    };

    let app_state = build_state(
        &settings,
        Arc::new(PgCredentialStore::new(pool)),
        session_store,
    )?;

    if settings.session.sweep_interval_seconds > 0 {
        SessionSweeper::new(
            app_state.accounts.sessions().clone(),
            settings.session.sweep_interval_seconds,
        )
        .start();
    }

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = create_router(app_state);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
