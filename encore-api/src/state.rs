use std::sync::Arc;

use encore_catalog::{ArtistRoster, ConcessionMenu, SeatLayout, SeatMapGenerator, ShowCatalog};
use encore_core::activity::ActivityLogger;
use encore_core::events::{EventPublisher, LogPublisher};
use encore_core::identity::AuthService;
use encore_core::repository::{
    ActivityRepository, BookingRepository, ReviewRepository, SeatLedger, ShowRepository,
    UserRepository,
};
use encore_order::{BookingService, BookingSessions, ReviewService};
use encore_store::app_config::Config;
use encore_store::memory::{
    MemoryActivityRepository, MemoryBookingRepository, MemoryReviewRepository, MemorySeatLedger,
    MemoryShowRepository, MemoryUserRepository,
};
use encore_store::RedisClient;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Storage and messaging adapters the services are wired onto.
pub struct Backends {
    pub shows: Arc<dyn ShowRepository>,
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub activity: Arc<dyn ActivityRepository>,
    pub ledger: Arc<dyn SeatLedger>,
    pub events: Arc<dyn EventPublisher>,
    pub redis: Option<Arc<RedisClient>>,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self {
            shows: Arc::new(MemoryShowRepository::new(ShowCatalog::with_defaults())),
            users: Arc::new(MemoryUserRepository::new()),
            bookings: Arc::new(MemoryBookingRepository::new()),
            reviews: Arc::new(MemoryReviewRepository::new()),
            activity: Arc::new(MemoryActivityRepository::new()),
            ledger: Arc::new(MemorySeatLedger::new()),
            events: Arc::new(LogPublisher),
            redis: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub shows: Arc<dyn ShowRepository>,
    pub users: Arc<dyn UserRepository>,
    pub activity: Arc<dyn ActivityRepository>,
    pub identity: AuthService,
    pub booking: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
    pub sessions: BookingSessions,
    pub concessions: Arc<ConcessionMenu>,
    pub artists: Arc<ArtistRoster>,
    pub redis: Option<Arc<RedisClient>>,
    pub metrics: Arc<Metrics>,
    pub auth: AuthConfig,
    pub requests_per_minute: i64,
}

impl AppState {
    pub fn new(backends: Backends, config: &Config) -> anyhow::Result<Self> {
        let logger = ActivityLogger::new(backends.activity.clone());

        let identity = AuthService::new(backends.users.clone(), logger.clone())
            .with_admin_emails(&config.auth.admin_emails);

        let generator = SeatMapGenerator::new(SeatLayout::standard(), config.booking.availability_ratio)?;
        let booking = BookingService::new(
            backends.bookings,
            backends.ledger,
            logger.clone(),
            backends.events.clone(),
            generator,
        );

        let reviews = ReviewService::new(
            backends.reviews,
            logger,
            backends.events,
            config.booking.review_channel_capacity,
        );

        Ok(Self {
            shows: backends.shows,
            users: backends.users,
            activity: backends.activity,
            identity,
            booking: Arc::new(booking),
            reviews: Arc::new(reviews),
            sessions: BookingSessions::new(),
            concessions: Arc::new(ConcessionMenu::with_defaults()),
            artists: Arc::new(ArtistRoster::with_defaults()),
            redis: backends.redis,
            metrics: Arc::new(Metrics::new()?),
            auth: AuthConfig {
                secret: config.auth.jwt_secret.clone(),
                expiration: config.auth.jwt_expiration_seconds,
            },
            requests_per_minute: config.rate_limit.requests_per_minute,
        })
    }
}
