//! SQLite-based saved location storage.
//!
//! `SqliteLocationStore` keeps one row per saved location, keyed by `id`.
//! Writes use `INSERT OR REPLACE`, so saving an existing id replaces the row.
//! Observers are notified after each write commits, in commit order.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use skycast_core::RusqliteErrorExt;

use crate::location_backend::{
    validate_record, LocationsCallback, ObserverRegistry, SavedLocationBackend,
    SavedWeatherLocation, StoreError, StoreResult, Subscription,
};

const SELECT_COLUMNS: &str = "SELECT id, name_of_location, latitude, longitude FROM saved_weather_locations";

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.into_database_error())
}

pub struct SqliteLocationStore {
    conn: Mutex<Connection>,
    observers: Arc<ObserverRegistry>,
}

impl SqliteLocationStore {
    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(db_err)?;
        tracing::info!("Opened saved location store at {}", path.display());
        Self::with_connection(conn)
    }

    /// An in-memory store, gone when dropped.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            observers: ObserverRegistry::new(),
        })
    }

    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS saved_weather_locations (
                id TEXT PRIMARY KEY NOT NULL,
                name_of_location TEXT NOT NULL,
                latitude TEXT NOT NULL,
                longitude TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_saved_locations_name
                ON saved_weather_locations(name_of_location COLLATE NOCASE);
            "#,
        )
        .map_err(db_err)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<SavedWeatherLocation> {
        Ok(SavedWeatherLocation {
            id: row.get(0)?,
            name_of_location: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
        })
    }

    fn list_locked(conn: &Connection) -> StoreResult<Vec<SavedWeatherLocation>> {
        let mut stmt = conn
            .prepare(&format!(
                "{} ORDER BY name_of_location COLLATE NOCASE, id",
                SELECT_COLUMNS
            ))
            .map_err(db_err)?;

        let rows = stmt.query_map([], Self::row_to_record).map_err(db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Publish the committed state. Called with the connection still locked so
    /// observers see lists in commit order.
    fn publish(&self, conn: &Connection) {
        if self.observers.is_empty() {
            return;
        }
        match Self::list_locked(conn) {
            Ok(records) => self.observers.notify(&records),
            Err(e) => tracing::warn!("Failed to read saved locations for observers: {}", e),
        }
    }

    /// Number of saved locations.
    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM saved_weather_locations", [], |row| {
                row.get(0)
            })
            .map_err(db_err)?;
        Ok(count as usize)
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl SavedLocationBackend for SqliteLocationStore {
    fn insert_or_replace(&self, record: SavedWeatherLocation) -> StoreResult<()> {
        validate_record(&record)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO saved_weather_locations (id, name_of_location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.name_of_location,
                record.latitude,
                record.longitude
            ],
        )
        .map_err(db_err)?;

        tracing::debug!("Saved location {} ({})", record.name_of_location, record.id);
        self.publish(&conn);
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        let removed = conn
            .execute(
                "DELETE FROM saved_weather_locations WHERE id = ?1",
                params![id],
            )
            .map_err(db_err)?;

        if removed == 0 {
            return Err(StoreError::not_found(id));
        }

        tracing::debug!("Deleted saved location {}", id);
        self.publish(&conn);
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<SavedWeatherLocation>> {
        self.conn
            .lock()
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_record,
            )
            .optional()
            .map_err(db_err)
    }

    fn list(&self) -> StoreResult<Vec<SavedWeatherLocation>> {
        Self::list_locked(&self.conn.lock())
    }

    fn observe_all(&self, callback: LocationsCallback) -> StoreResult<Subscription> {
        let conn = self.conn.lock();
        let current = Self::list_locked(&conn)?;
        callback(current.as_slice());
        Ok(self.observers.register(callback))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::sync::mpsc;

    fn create_test_store() -> SqliteLocationStore {
        SqliteLocationStore::in_memory().expect("Failed to create in-memory store")
    }

    fn new_york() -> SavedWeatherLocation {
        SavedWeatherLocation {
            id: "1".to_string(),
            name_of_location: "New York".to_string(),
            latitude: "40.7128".to_string(),
            longitude: "74.0060".to_string(),
        }
    }

    fn record(id: &str, name: &str) -> SavedWeatherLocation {
        SavedWeatherLocation {
            id: id.to_string(),
            name_of_location: name.to_string(),
            latitude: "1.0".to_string(),
            longitude: "2.0".to_string(),
        }
    }

    fn observe(store: &SqliteLocationStore) -> (Subscription, mpsc::Receiver<Vec<SavedWeatherLocation>>) {
        let (tx, rx) = mpsc::channel();
        let sub = store
            .observe_all(Box::new(move |records| {
                let _ = tx.send(records.to_vec());
            }))
            .unwrap();
        (sub, rx)
    }

    #[test]
    fn test_save_then_observe_yields_single_record() {
        let store = create_test_store();
        store.insert_or_replace(new_york()).unwrap();

        let (_sub, rx) = observe(&store);

        assert_eq!(rx.try_recv().unwrap(), vec![new_york()]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_same_id_replaces() {
        let store = create_test_store();
        store.insert_or_replace(new_york()).unwrap();

        let renamed = SavedWeatherLocation {
            name_of_location: "NYC".to_string(),
            ..new_york()
        };
        store.insert_or_replace(renamed.clone()).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("1").unwrap(), Some(renamed));
    }

    #[test]
    fn test_list_is_ordered_by_name() {
        let store = create_test_store();
        store.insert_or_replace(record("b", "zurich")).unwrap();
        store.insert_or_replace(record("a", "Amsterdam")).unwrap();
        store.insert_or_replace(record("c", "berlin")).unwrap();

        let names: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.name_of_location)
            .collect();
        assert_eq!(names, vec!["Amsterdam", "berlin", "zurich"]);
    }

    #[test]
    fn test_observer_sees_every_commit() {
        let store = create_test_store();
        let (_sub, rx) = observe(&store);
        assert!(rx.try_recv().unwrap().is_empty());

        store.insert_or_replace(record("1", "Home")).unwrap();
        store.insert_or_replace(record("2", "Work")).unwrap();
        store.delete("1").unwrap();

        assert_eq!(rx.try_recv().unwrap().len(), 1);
        assert_eq!(rx.try_recv().unwrap().len(), 2);
        assert_eq!(rx.try_recv().unwrap(), vec![record("2", "Work")]);
    }

    #[test]
    fn test_failed_write_does_not_notify() {
        let store = create_test_store();
        let (_sub, rx) = observe(&store);
        rx.try_recv().unwrap();

        assert!(matches!(
            store.insert_or_replace(record("", "Nowhere")),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(store.delete("missing"), Err(StoreError::NotFound(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscription_stops_updates() {
        let store = create_test_store();
        let (sub, rx) = observe(&store);
        rx.try_recv().unwrap();
        assert_eq!(store.observer_count(), 1);

        drop(sub);
        store.insert_or_replace(record("1", "Home")).unwrap();

        assert_eq!(store.observer_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_get_nonexistent() {
        let store = create_test_store();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.db");

        {
            let store = SqliteLocationStore::open(&path).unwrap();
            store.insert_or_replace(new_york()).unwrap();
        }

        let store = SqliteLocationStore::open(&path).unwrap();
        assert_eq!(store.list().unwrap(), vec![new_york()]);
    }
}
