use crate::config::Config;
use crate::error::StoreError;
use crate::models::VoteRecord;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Row, Sqlite};

/// Durable home of vote records.
///
/// Implementations must make `replace_voter_records` all-or-nothing: a
/// reader sees either the voter's old records or the new ones, never a mix.
#[async_trait]
pub trait VoteStore: Send + Sync {
    // Every record, oldest first
    async fn fetch_records(&self) -> Result<Vec<VoteRecord>, StoreError>;

    // Deletes the voter's records and writes one per nominee, in order.
    // Returns the number written.
    async fn replace_voter_records(&self, voter: &str, nominees: &[String]) -> Result<usize, StoreError>;
}

pub struct Database {
    pool: SqlitePool,
}

// Fixed-width UTC text so that string order matches time order
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(&config.database_url).await.unwrap_or(false) {
            info!("Creating database at {}", config.database_url);
            Sqlite::create_database(&config.database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // Single connection that never expires, otherwise the data goes with it
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                voter TEXT NOT NULL CHECK (voter <> ''),
                nominee TEXT NOT NULL CHECK (nominee <> ''),
                cast_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS votes_voter_idx ON votes (voter);")
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl VoteStore for Database {
    async fn fetch_records(&self) -> Result<Vec<VoteRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, voter, nominee, cast_at
            FROM votes
            ORDER BY cast_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<VoteRecord, StoreError> {
                let id = row.get::<i64, _>("id");
                let cast_at_str = row.get::<String, _>("cast_at");
                let cast_at = DateTime::parse_from_rfc3339(&cast_at_str)
                    .map_err(|source| StoreError::Timestamp {
                        id,
                        value: cast_at_str.clone(),
                        source,
                    })?
                    .with_timezone(&Utc);

                Ok(VoteRecord::new(
                    row.get::<String, _>("voter"),
                    row.get::<String, _>("nominee"),
                    cast_at,
                ))
            })
            .collect()
    }

    async fn replace_voter_records(&self, voter: &str, nominees: &[String]) -> Result<usize, StoreError> {
        // Rolled back on drop if anything below fails
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM votes WHERE voter = ?")
            .bind(voter)
            .execute(&mut *tx)
            .await?;

        let submitted_at = Utc::now();
        for (i, nominee) in nominees.iter().enumerate() {
            let cast_at = submitted_at + Duration::microseconds(i as i64);
            sqlx::query(
                r#"
                INSERT INTO votes (voter, nominee, cast_at)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(voter)
            .bind(nominee)
            .bind(format_timestamp(cast_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(nominees.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_store_has_no_records() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.fetch_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_come_back_in_submission_order() {
        let db = Database::in_memory().await.unwrap();
        let written = db.replace_voter_records("Ada", &owned(&["Zed", "Bo", "Zed"])).await.unwrap();
        assert_eq!(written, 3);

        let records = db.fetch_records().await.unwrap();
        let nominees: Vec<&str> = records.iter().map(|r| r.nominee.as_str()).collect();
        assert_eq!(nominees, vec!["Zed", "Bo", "Zed"]);
        assert!(records.windows(2).all(|pair| pair[0].cast_at < pair[1].cast_at));
    }

    #[tokio::test]
    async fn replacement_only_touches_one_voter() {
        let db = Database::in_memory().await.unwrap();
        db.replace_voter_records("Ada", &owned(&["Bo", "Cy"])).await.unwrap();
        db.replace_voter_records("Bo", &owned(&["Ada"])).await.unwrap();
        db.replace_voter_records("Ada", &owned(&["Dee"])).await.unwrap();

        let records = db.fetch_records().await.unwrap();
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.voter.as_str(), r.nominee.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Bo", "Ada"), ("Ada", "Dee")]);
    }

    #[tokio::test]
    async fn failed_replacement_keeps_previous_records() {
        let db = Database::in_memory().await.unwrap();
        db.replace_voter_records("Ada", &owned(&["Bo"])).await.unwrap();

        // Second insert violates the non-empty check
        let result = db.replace_voter_records("Ada", &owned(&["Cy", ""])).await;
        assert!(matches!(result, Err(StoreError::Database(_))));

        let records = db.fetch_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nominee, "Bo");
    }

    #[tokio::test]
    async fn usable_as_shared_trait_object() {
        let store: Arc<dyn VoteStore> = Arc::new(Database::in_memory().await.unwrap());
        store.replace_voter_records("Ada", &owned(&["Bo"])).await.unwrap();
        assert_eq!(store.fetch_records().await.unwrap().len(), 1);
    }

    #[test]
    fn timestamps_sort_as_text() {
        let early = DateTime::parse_from_rfc3339("2024-03-01T09:59:59.999999Z").unwrap().with_timezone(&Utc);
        let late = early + Duration::microseconds(1);
        assert!(format_timestamp(early) < format_timestamp(late));
        assert_eq!(format_timestamp(late), "2024-03-01T10:00:00.000000Z");
    }
}
