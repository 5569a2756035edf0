use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use encore_catalog::{Show, TierPrices};
use encore_core::repository::{RepoError, ShowRepository};
use sqlx::PgPool;
use tracing::info;

pub struct PgShowRepository {
    pool: PgPool,
}

impl PgShowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the given shows unless a row with the same id already exists.
    pub async fn seed(&self, shows: &[Show]) -> Result<u64, RepoError> {
        let mut inserted = 0;
        for show in shows {
            let result = sqlx::query(
                r#"
                INSERT INTO shows (id, title, date, time, venue, duration, genre, description, image, price_vip, price_premium, price_regular)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&show.id)
            .bind(&show.title)
            .bind(show.date)
            .bind(show.time)
            .bind(&show.venue)
            .bind(&show.duration)
            .bind(&show.genre)
            .bind(&show.description)
            .bind(&show.image)
            .bind(show.price.vip)
            .bind(show.price.premium)
            .bind(show.price.regular)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        info!("Seeded {} show(s)", inserted);
        Ok(inserted)
    }
}

#[derive(sqlx::FromRow)]
struct ShowRow {
    id: String,
    title: String,
    date: NaiveDate,
    time: NaiveTime,
    venue: String,
    duration: String,
    genre: String,
    description: String,
    image: String,
    price_vip: i64,
    price_premium: i64,
    price_regular: i64,
}

impl From<ShowRow> for Show {
    fn from(row: ShowRow) -> Self {
        Show {
            id: row.id,
            title: row.title,
            date: row.date,
            time: row.time,
            venue: row.venue,
            duration: row.duration,
            genre: row.genre,
            description: row.description,
            image: row.image,
            price: TierPrices::new(row.price_vip, row.price_premium, row.price_regular),
        }
    }
}

const SHOW_COLUMNS: &str =
    "id, title, date, time, venue, duration, genre, description, image, price_vip, price_premium, price_regular";

#[async_trait]
impl ShowRepository for PgShowRepository {
    async fn list_shows(
        &self,
        genre: Option<&str>,
    ) -> Result<Vec<Show>, RepoError> {
        let rows: Vec<ShowRow> = match genre {
            Some(genre) => {
                sqlx::query_as(&format!(
                    "SELECT {} FROM shows WHERE LOWER(genre) = LOWER($1) ORDER BY date, time",
                    SHOW_COLUMNS
                ))
                .bind(genre)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {} FROM shows ORDER BY date, time", SHOW_COLUMNS))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Show::from).collect())
    }

    async fn get_show(
        &self,
        id: &str,
    ) -> Result<Option<Show>, RepoError> {
        let row: Option<ShowRow> = sqlx::query_as(&format!("SELECT {} FROM shows WHERE id = $1", SHOW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Show::from))
    }
}
