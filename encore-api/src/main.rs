use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use encore_api::{app, AppState, Backends};
use encore_catalog::ShowCatalog;
use encore_core::events::EventPublisher;
use encore_core::repository::SeatLedger;
use encore_store::activity_repo::PgActivityRepository;
use encore_store::app_config::Config;
use encore_store::booking_repo::{PgBookingRepository, PgSeatLedger};
use encore_store::review_repo::PgReviewRepository;
use encore_store::show_repo::PgShowRepository;
use encore_store::user_repo::PgUserRepository;
use encore_store::{DbClient, EventProducer, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Encore API on port {}", config.server.port);

    let backends = build_backends(&config).await?;
    let app_state = AppState::new(backends, &config)?;
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Postgres when configured, otherwise in-memory stores. Redis and Kafka are optional extras.
async fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    let mut backends = Backends::in_memory();

    // Redis Connection
    if let Some(url) = &config.redis.url {
        match RedisClient::new(url).await {
            Ok(client) => backends.redis = Some(Arc::new(client)),
            Err(e) => tracing::warn!("Redis unavailable, continuing without it: {}", e),
        }
    }

    // Kafka Connection
    if let Some(brokers) = &config.kafka.brokers {
        let producer = EventProducer::new(brokers).context("Failed to create Kafka producer")?;
        backends.events = Arc::new(producer) as Arc<dyn EventPublisher>;
    }

    // Postgres Connection
    if let Some(url) = &config.database.url {
        let db = DbClient::new(url, config.database.max_connections)
            .await
            .context("Failed to connect to Postgres")?;
        db.migrate().await.context("Failed to run migrations")?;

        let shows = PgShowRepository::new(db.pool.clone());
        if config.booking.seed_shows {
            shows
                .seed(ShowCatalog::with_defaults().list())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to seed shows: {}", e))?;
        }

        backends.shows = Arc::new(shows);
        backends.users = Arc::new(PgUserRepository::new(db.pool.clone()));
        backends.bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));
        backends.reviews = Arc::new(PgReviewRepository::new(db.pool.clone()));
        backends.activity = Arc::new(PgActivityRepository::new(db.pool.clone()));
        backends.ledger = Arc::new(PgSeatLedger::new(db.pool.clone()));
        tracing::info!("Using Postgres storage");
    } else {
        tracing::info!("No database configured, using in-memory storage");
    }

    // Redis owns the seat ledger when present
    if let Some(redis) = &backends.redis {
        backends.ledger = redis.clone() as Arc<dyn SeatLedger>;
    }

    Ok(backends)
}
