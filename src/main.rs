//! Outbox worker binary.
//!
//! Hosts the scheduled outbox dispatcher: loads configuration, connects the
//! pools, builds the in-process handler registry, and drains the outbox on
//! the configured interval until the process receives ctrl-c.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use portfolio::adapters::postgres::PostgresOutboxStore;
use portfolio::adapters::{InMemoryEventBus, OutboxDispatcher, SystemClock};
use portfolio::config::AppConfig;
use portfolio::domain::foundation::{DomainError, EventEnvelope};
use portfolio::domain::user::UserRegistered;
use portfolio::ports::{EventHandler, EventSubscriber};

/// Placeholder subscriber: logs each registration as it is delivered.
/// Real reactions (welcome email, provisioning) hang off the same seam.
struct LogUserRegistered;

#[async_trait]
impl EventHandler for LogUserRegistered {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let registered: UserRegistered = event.payload_as().map_err(|e| {
            DomainError::new(
                portfolio::domain::foundation::ErrorCode::SerializationError,
                format!("Unexpected payload for {}: {}", event.event_type, e),
            )
        })?;

        tracing::info!(user_id = %registered.user_id, "User registration delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogUserRegistered"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let bus = Arc::new(InMemoryEventBus::new());
    bus.subscribe(UserRegistered::EVENT_TYPE, Arc::new(LogUserRegistered));

    let dispatcher = OutboxDispatcher::new(
        Arc::new(PostgresOutboxStore::new(pool)),
        bus,
        Arc::new(SystemClock),
        config.outbox.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(async move { dispatcher.run(shutdown_rx).await });

    tracing::info!(
        interval_in_seconds = config.outbox.interval_in_seconds,
        batch_size = config.outbox.batch_size,
        "Outbox worker started"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    shutdown_tx.send(true).ok();
    worker.await?;

    Ok(())
}
