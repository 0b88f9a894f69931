use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::error::StorageError;

/// Durable string key-value storage used for the session
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Write every entry or none of them
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;
    /// Remove every key or none of them
    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// SQLite-backed key-value store.
///
/// The database file lives in the user's data directory:
/// - Linux: ~/.local/share/ifoto/ifoto.db
/// - macOS: ~/Library/Application Support/ifoto/ifoto.db
/// - Windows: %APPDATA%\ifoto\ifoto.db
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open the store in `dir`, or in the default data directory
    pub fn open_in(dir: Option<&Path>) -> Result<Self, StorageError> {
        let db_path = match dir {
            Some(dir) => dir.join("ifoto.db"),
            None => Self::default_db_path()?,
        };
        Self::open(&db_path)
    }

    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!("📁 Session store at: {}", db_path.display());

        let store = SqliteStore {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Volatile store, used when the data directory is unusable
    pub fn in_memory() -> Result<Self, StorageError> {
        let store = SqliteStore {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn default_db_path() -> Result<PathBuf, StorageError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(StorageError::NoDataDir)?;
        path.push("ifoto");
        path.push("ifoto.db");
        Ok(path)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS kv (
                    key     TEXT PRIMARY KEY,
                    value   TEXT NOT NULL
                )",
                [],
            )?;
            Ok(())
        })
    }

    /// Path to the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        f(&conn)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                rusqlite::params![key, value],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            // Dropping the transaction without commit rolls it back
            let tx = conn.unchecked_transaction()?;
            for (key, value) in entries {
                tx.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![key, value],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            for key in keys {
                tx.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // removing a missing key is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SqliteStore::open_in(Some(dir.path())).unwrap();
            store.set("ifoto_token", "abc").unwrap();
            assert_eq!(store.path(), Some(dir.path().join("ifoto.db").as_path()));
        }

        let reopened = SqliteStore::open_in(Some(dir.path())).unwrap();
        assert_eq!(reopened.get("ifoto_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_set_many_is_all_or_nothing() {
        let store = SqliteStore::in_memory().unwrap();
        store.set_many(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        store
            .with_conn(|conn| {
                conn.execute_batch(
                    "DROP TABLE kv;
                     CREATE TABLE kv (
                         key TEXT PRIMARY KEY,
                         value TEXT NOT NULL CHECK (key <> 'user')
                     );",
                )?;
                Ok(())
            })
            .unwrap();

        assert!(store.set_many(&[("token", "jwt"), ("user", "{}")]).is_err());
        assert_eq!(store.get("token").unwrap(), None);

        store.set_many(&[("token", "jwt"), ("role", "x")]).unwrap();
        store.remove_many(&["token", "role"]).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }
}
