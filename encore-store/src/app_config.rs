use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingRules,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Without a url the service keeps everything in memory.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KafkaConfig {
    pub brokers: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
    /// Accounts registered with these emails get the admin role.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

fn default_jwt_expiration() -> u64 { 86_400 }

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_availability_ratio")]
    pub availability_ratio: f64,
    #[serde(default = "default_true")]
    pub seed_shows: bool,
    #[serde(default = "default_review_channel_capacity")]
    pub review_channel_capacity: usize,
}

fn default_availability_ratio() -> f64 { 0.7 }
fn default_true() -> bool { true }
fn default_review_channel_capacity() -> usize { 100 }

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            availability_ratio: default_availability_ratio(),
            seed_shows: true,
            review_channel_capacity: default_review_channel_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { requests_per_minute: 100 }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked developer overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `ENCORE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("ENCORE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(raw: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
