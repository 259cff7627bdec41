//! SQLite-backed prediction store.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection};
use salary_core::{NewPrediction, PredictionRecord, PredictionStore, StoreError};
use tracing::{debug, info};

/// Path value that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// SQLite-backed prediction history. Rows are only ever inserted.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        if path == IN_MEMORY {
            return Self::in_memory();
        }

        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("failed to create db directory: {}", e)))?;
        }

        let conn = Connection::open(path).map_err(db_err)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        info!("Prediction store opened at {}", path);
        Ok(store)
    }

    /// Creates an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                years REAL NOT NULL,
                predicted_salary REAL NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_predictions_created_at
                ON predictions(created_at);
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))
            .map_err(db_err)
    }

    fn insert(&self, prediction: NewPrediction, created_at_ms: i64) -> Result<PredictionRecord, StoreError> {
        let record = PredictionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            years: prediction.years,
            predicted_salary: prediction.predicted_salary,
            created_at: millis_to_datetime(created_at_ms)?,
        };

        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        conn.execute(
            r#"INSERT INTO predictions (id, years, predicted_salary, created_at)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![record.id, record.years, record.predicted_salary, created_at_ms],
        )
        .map_err(db_err)?;

        debug!("Stored prediction {} (years={})", record.id, record.years);
        Ok(record)
    }
}

#[async_trait]
impl PredictionStore for SqliteStore {
    async fn append(&self, prediction: NewPrediction) -> Result<PredictionRecord, StoreError> {
        self.insert(prediction, Utc::now().timestamp_millis())
    }

    async fn history(&self) -> Result<Vec<PredictionRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        let mut stmt = conn
            .prepare(
                r#"SELECT id, years, predicted_salary, created_at
                   FROM predictions
                   ORDER BY created_at DESC, seq DESC"#,
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(db_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, years, predicted_salary, created_at) = row.map_err(db_err)?;
            records.push(PredictionRecord {
                id,
                years,
                predicted_salary,
                created_at: millis_to_datetime(created_at)?,
            });
        }

        Ok(records)
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {}", ms)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        let store = SqliteStore::in_memory().unwrap();
        let before = Utc::now().timestamp_millis();

        let record = store.append(NewPrediction::new(5.0, 85000.5)).await.unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.years, 5.0);
        assert_eq!(record.predicted_salary, 85000.5);
        assert!(record.created_at.timestamp_millis() >= before);
        assert!(record.created_at.timestamp_millis() <= Utc::now().timestamp_millis());

        let history = store.history().await.unwrap();
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        let first = store.insert(NewPrediction::new(1.0, 45000.0), 1_700_000_000_000).unwrap();
        let third = store.insert(NewPrediction::new(3.0, 60000.0), 1_700_000_002_000).unwrap();
        let second = store.insert(NewPrediction::new(2.0, 52000.0), 1_700_000_001_000).unwrap();

        let history = store.history().await.unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);
        assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_same_timestamp_latest_insert_first() {
        let store = SqliteStore::in_memory().unwrap();
        let older = store.insert(NewPrediction::new(1.0, 1.0), 1_700_000_000_000).unwrap();
        let newer = store.insert(NewPrediction::new(2.0, 2.0), 1_700_000_000_000).unwrap();

        let history = store.history().await.unwrap();
        assert_eq!(history[0].id, newer.id);
        assert_eq!(history[1].id, older.id);
    }

    #[tokio::test]
    async fn test_history_is_stable_without_writes() {
        let store = SqliteStore::in_memory().unwrap();
        for years in [1.0, 4.0, 9.5] {
            store.append(NewPrediction::new(years, years * 10_000.0)).await.unwrap();
        }

        let first = store.history().await.unwrap();
        let second = store.history().await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.append(NewPrediction::new(2.0, 50000.0)).await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.append(NewPrediction::new(7.0, 95000.0)).await })
        };

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert_ne!(a.id, b.id);

        let history = store.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.contains(&a));
        assert!(history.contains(&b));
    }

    #[tokio::test]
    async fn test_open_file_persists_across_handles() {
        let dir = std::env::temp_dir().join(format!("salary-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("predictions.db");
        let path = path.to_str().unwrap().to_string();

        let stored = {
            let store = SqliteStore::open(&path).unwrap();
            store.append(NewPrediction::new(6.0, 88000.0)).await.unwrap()
        };

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.history().await.unwrap(), vec![stored]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_in_memory_path() {
        let store = SqliteStore::open(IN_MEMORY).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
