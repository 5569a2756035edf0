pub mod app_config;
pub mod database;
pub mod show_repo;
pub mod user_repo;
pub mod booking_repo;
pub mod review_repo;
pub mod activity_repo;
pub mod redis_repo;
pub mod events;
pub mod memory;

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use events::EventProducer;
