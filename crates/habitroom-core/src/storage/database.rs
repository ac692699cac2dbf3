//! SQLite-based snapshot storage.
//!
//! Provides persistent storage for:
//! - The full tracker snapshot (key-value store)
//! - An append-only copy of the day history, queryable with SQL

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::{data_dir, Snapshot, SnapshotStore};
use crate::day::HistoryRecord;
use crate::error::StorageError;

/// Database file name inside the data directory.
pub const DB_FILE: &str = "habitroom.db";

const SNAPSHOT_KEY: &str = "snapshot";

/// SQLite database for snapshot storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/habitroom/habitroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS history (
                seq           INTEGER PRIMARY KEY,
                date          TEXT NOT NULL,
                points_earned INTEGER NOT NULL,
                goal_points   INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_date ON history(date);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store, on a connection or an open transaction.
    fn kv_set(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// History rows in the order they were closed.
    pub fn history(&self) -> Result<Vec<HistoryRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT date, points_earned, goal_points FROM history ORDER BY seq",
        )?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(0)?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
            })?;
            Ok(HistoryRecord {
                date,
                points_earned: row.get(1)?,
                goal_points: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    fn history_len(&self) -> Result<usize, rusqlite::Error> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl SnapshotStore for Database {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        match self.kv_get(SNAPSHOT_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Store the snapshot and append history rows not yet mirrored.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot)?;
        let tx = self.conn.unchecked_transaction()?;

        let known = self.history_len()?;
        for (seq, record) in snapshot.history.iter().enumerate().skip(known) {
            tx.execute(
                "INSERT INTO history (seq, date, points_earned, goal_points)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    seq as i64,
                    record.date.format("%Y-%m-%d").to_string(),
                    record.points_earned,
                    record.goal_points,
                ],
            )?;
        }
        Self::kv_set(&tx, SNAPSHOT_KEY, &json)?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::Badge;

    fn record(day: u32, points: u32) -> HistoryRecord {
        HistoryRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            points_earned: points,
            goal_points: 1000,
        }
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        Database::kv_set(&db.conn, "test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn snapshot_write_rolls_back_with_its_transaction() {
        let db = Database::open_memory().unwrap();
        {
            let tx = db.conn.unchecked_transaction().unwrap();
            Database::kv_set(&tx, SNAPSHOT_KEY, "{}").unwrap();
            // Dropped without commit.
        }
        assert!(db.load().unwrap().is_none());

        db.save(&Snapshot::default()).unwrap();
        assert_eq!(db.load().unwrap(), Some(Snapshot::default()));
    }

    #[test]
    fn empty_database_is_first_run() {
        let db = Database::open_memory().unwrap();
        assert!(db.load().unwrap().is_none());
        assert!(db.history().unwrap().is_empty());
    }

    #[test]
    fn snapshot_and_history_mirror() {
        let db = Database::open_memory().unwrap();
        let mut snapshot = Snapshot {
            history: vec![record(1, 900), record(2, 1100)],
            badges: [Badge::Gold].into_iter().collect(),
            ..Default::default()
        };
        db.save(&snapshot).unwrap();
        assert_eq!(db.history().unwrap(), snapshot.history);

        // Saving again only appends the new day.
        snapshot.history.push(record(3, 1300));
        db.save(&snapshot).unwrap();
        db.save(&snapshot).unwrap();
        assert_eq!(db.history().unwrap().len(), 3);
        assert_eq!(db.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn file_backed_database_reopens() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let db = Database::open_at(&path).unwrap();
            db.save(&Snapshot {
                active_days: 2,
                ..Default::default()
            })
            .unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load().unwrap().unwrap().active_days, 2);
    }
}
