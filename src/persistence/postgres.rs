use anyhow::{Context, Result};
use r2d2_postgres::{postgres::NoTls, PostgresConnectionManager};

pub type PostgresPool = r2d2::Pool<PostgresConnectionManager<NoTls>>;
pub type PostgresConnection = r2d2::PooledConnection<PostgresConnectionManager<NoTls>>;

/// Tables every Postgres store expects; safe to run on every start
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    max_total_commitment BIGINT
);

CREATE TABLE IF NOT EXISTS items (
    item_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    base_price BIGINT NOT NULL,
    owner_id TEXT NOT NULL REFERENCES users (user_id),
    closes_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS bids (
    bid_id BIGSERIAL PRIMARY KEY,
    bid_uuid TEXT NOT NULL UNIQUE,
    item_id TEXT NOT NULL REFERENCES items (item_id),
    bidder_id TEXT NOT NULL REFERENCES users (user_id),
    price BIGINT NOT NULL,
    sequence BIGINT NOT NULL,
    UNIQUE (item_id, sequence)
);

CREATE TABLE IF NOT EXISTS auto_bids (
    auto_bid_id BIGSERIAL PRIMARY KEY,
    auto_bid_uuid TEXT NOT NULL UNIQUE,
    item_id TEXT NOT NULL REFERENCES items (item_id),
    bidder_id TEXT NOT NULL REFERENCES users (user_id),
    UNIQUE (item_id, bidder_id)
);
"#;

/// Connection pool shared by all the Postgres stores
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PostgresPool,
}

impl PostgresPersistence {
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        let manager = PostgresConnectionManager::new(
            database_url.parse().context("invalid database url")?,
            NoTls,
        );
        let pool = r2d2::Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .context("failed to build connection pool")?;

        let persistence = Self { pool };
        persistence
            .get_connection()?
            .batch_execute(SCHEMA)
            .context("failed to create tables")?;
        Ok(persistence)
    }

    pub fn get_connection(&self) -> Result<PostgresConnection> {
        self.pool.get().context("failed to get connection from pool")
    }
}

/// Postgres `BIGINT` to amount, rejecting negative values
pub fn to_amount(value: i64) -> Result<u64> {
    u64::try_from(value).with_context(|| format!("negative amount in database: {value}"))
}

pub fn from_amount(value: u64) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("amount too large for database: {value}"))
}
