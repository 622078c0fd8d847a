use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Sqlite>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // WAL не поддерживается для in-memory базы
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(pool_size.max(1))
            .acquire_timeout(Duration::from_secs(5));
        if in_memory {
            // closing the last connection drops the in-memory database
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        Ok(Database { pool })
    }

    /// Fresh in-memory database with the schema applied. sqlx opens
    /// `sqlite::memory:` as a uniquely named shared-cache database, so every
    /// connection of this pool sees the same data and other pools do not.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let db = Self::new("sqlite::memory:", 1).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_connections_share_data() {
        let db = Database::new("sqlite::memory:", 2).await.unwrap();
        db.run_migrations().await.unwrap();

        let mut writer = db.pool.acquire().await.unwrap();
        let mut reader = db.pool.acquire().await.unwrap();
        sqlx::query(
            "INSERT INTO cafe (name, map_url, img_url, location, seats, \
             has_toilet, has_wifi, has_sockets, can_take_calls) \
             VALUES ('Shared', 'm', 'i', 'l', 's', 'TRUE', 'TRUE', 'TRUE', 'TRUE')",
        )
        .execute(&mut *writer)
        .await
        .unwrap();

        let seen: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cafe")
            .fetch_one(&mut *reader)
            .await
            .unwrap();
        assert_eq!(seen, 1);

        let other = Database::in_memory().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cafe")
            .fetch_one(&other.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
