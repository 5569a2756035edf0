use std::collections::HashSet;

use async_trait::async_trait;
use encore_core::repository::{RepoError, SeatLedger};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use tracing::info;
use uuid::Uuid;

// KEYS[1] booked set, KEYS[2] holder hash. ARGV[1] holder, ARGV[2..] seat ids.
const CLAIM_SEATS_SCRIPT: &str = r#"
    local taken = {}
    for i = 2, #ARGV do
        if redis.call("SISMEMBER", KEYS[1], ARGV[i]) == 1 then
            table.insert(taken, ARGV[i])
        end
    end
    if #taken > 0 then
        return taken
    end
    for i = 2, #ARGV do
        redis.call("SADD", KEYS[1], ARGV[i])
        redis.call("HSET", KEYS[2], ARGV[i], ARGV[1])
    end
    return taken
"#;

// KEYS[1] counter. ARGV[1] window seconds. The first hit in a window sets the expiry.
const RATE_LIMIT_SCRIPT: &str = r#"
    local count = redis.call("INCR", KEYS[1])
    if count == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return count
"#;

#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
}

impl RedisClient {
    /// Connects eagerly and pings, so an unreachable server fails here rather than per request.
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { conn })
    }

    fn booked_key(show_id: &str) -> String {
        format!("show:{}:booked", show_id)
    }

    fn holders_key(show_id: &str) -> String {
        format!("show:{}:holders", show_id)
    }

    /// Fixed-window counter. Returns false once `limit` is exceeded inside the window.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.conn.clone();
        let count: i64 = redis::Script::new(RATE_LIMIT_SCRIPT)
            .key(key)
            .arg(window_seconds)
            .invoke_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

#[async_trait]
impl SeatLedger for RedisClient {
    async fn claim_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
        holder: Uuid,
    ) -> Result<Vec<String>, RepoError> {
        let mut conn = self.conn.clone();
        let script = redis::Script::new(CLAIM_SEATS_SCRIPT);

        let taken: Vec<String> = script
            .key(Self::booked_key(show_id))
            .key(Self::holders_key(show_id))
            .arg(holder.to_string())
            .arg(seat_ids)
            .invoke_async(&mut conn)
            .await?;

        if taken.is_empty() {
            info!("Claimed {} seat(s) for show {} in redis", seat_ids.len(), show_id);
        }
        Ok(taken)
    }

    async fn release_seats(
        &self,
        show_id: &str,
        seat_ids: &[String],
    ) -> Result<(), RepoError> {
        if seat_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .srem(Self::booked_key(show_id), seat_ids)
            .ignore()
            .hdel(Self::holders_key(show_id), seat_ids)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn booked_seats(
        &self,
        show_id: &str,
    ) -> Result<HashSet<String>, RepoError> {
        let mut conn = self.conn.clone();
        let booked: HashSet<String> = conn.smembers(Self::booked_key(show_id)).await?;
        Ok(booked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Run with: docker run -d -p 6379:6379 redis:7-alpine
    const REDIS_URL: &str = "redis://127.0.0.1:6379";

    #[tokio::test]
    async fn test_unreachable_server_fails_to_connect() {
        assert!(RedisClient::new("redis://127.0.0.1:1").await.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_rate_limit_window_keeps_first_expiry() {
        let redis = RedisClient::new(REDIS_URL).await.unwrap();
        let key = format!("test:rate:{}", Uuid::new_v4());

        assert!(redis.check_rate_limit(&key, 3, 60).await.unwrap());
        let mut conn = redis.conn.clone();
        let first_ttl: i64 = conn.ttl(&key).await.unwrap();
        assert!(first_ttl > 0 && first_ttl <= 60);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(redis.check_rate_limit(&key, 3, 60).await.unwrap());
        assert!(redis.check_rate_limit(&key, 3, 60).await.unwrap());
        assert!(!redis.check_rate_limit(&key, 3, 60).await.unwrap());

        // Later hits must not push the window out.
        let ttl: i64 = conn.ttl(&key).await.unwrap();
        assert!(ttl < first_ttl);

        let _: () = conn.del(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_seat_claims_are_all_or_nothing() {
        let redis = RedisClient::new(REDIS_URL).await.unwrap();
        let show = format!("test-{}", Uuid::new_v4());
        let first = vec!["A1".to_string(), "A2".to_string()];
        let overlap = vec!["A2".to_string(), "A3".to_string()];

        assert!(redis.claim_seats(&show, &first, Uuid::new_v4()).await.unwrap().is_empty());
        let taken = redis.claim_seats(&show, &overlap, Uuid::new_v4()).await.unwrap();
        assert_eq!(taken, vec!["A2".to_string()]);
        assert!(!redis.booked_seats(&show).await.unwrap().contains("A3"));

        redis.release_seats(&show, &first).await.unwrap();
        assert!(redis.booked_seats(&show).await.unwrap().is_empty());
    }
}
