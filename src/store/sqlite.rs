use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::{Result, StoryError};
use crate::domain::{LIKED_ITEM_IDS_KEY, SEEN_USER_IDS_KEY};
use crate::store::Store;

/// SQLite-backed key-value store. Each set is one row holding a JSON array.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| StoryError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            StoryError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load_set<T>(&self, key: &str) -> Result<HashSet<T>>
    where
        T: DeserializeOwned + Eq + std::hash::Hash,
    {
        match self.get_value(key)? {
            Some(raw) => {
                let list: Vec<T> = serde_json::from_str(&raw)?;
                Ok(list.into_iter().collect())
            }
            None => Ok(HashSet::new()),
        }
    }

    fn save_set<T: Serialize>(&self, key: &str, set: &HashSet<T>) -> Result<()> {
        let list: Vec<&T> = set.iter().collect();
        let raw = serde_json::to_string(&list)?;
        self.set_value(key, &raw)
    }
}

impl Store for SqliteStore {
    fn load_seen_user_ids(&self) -> Result<HashSet<i64>> {
        self.load_set(SEEN_USER_IDS_KEY)
    }

    fn save_seen_user_ids(&self, ids: &HashSet<i64>) -> Result<()> {
        self.save_set(SEEN_USER_IDS_KEY, ids)
    }

    fn load_liked_item_ids(&self) -> Result<HashSet<String>> {
        self.load_set(LIKED_ITEM_IDS_KEY)
    }

    fn save_liked_item_ids(&self, ids: &HashSet<String>) -> Result<()> {
        self.save_set(LIKED_ITEM_IDS_KEY, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_load_empty() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_seen_user_ids().unwrap().is_empty());
        assert!(store.load_liked_item_ids().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_seen() {
        let store = SqliteStore::in_memory().unwrap();
        let ids: HashSet<i64> = [3, 1, 2].into_iter().collect();
        store.save_seen_user_ids(&ids).unwrap();
        assert_eq!(store.load_seen_user_ids().unwrap(), ids);
    }

    #[test]
    fn test_save_overwrites_previous_value() {
        let store = SqliteStore::in_memory().unwrap();
        let first: HashSet<String> = ["1-1".to_string()].into_iter().collect();
        let second: HashSet<String> = ["2-3".to_string(), "4-1".to_string()].into_iter().collect();

        store.save_liked_item_ids(&first).unwrap();
        store.save_liked_item_ids(&second).unwrap();

        assert_eq!(store.load_liked_item_ids().unwrap(), second);
    }

    #[test]
    fn test_entries_are_json_arrays_under_named_keys() {
        let store = SqliteStore::in_memory().unwrap();
        let ids: HashSet<i64> = [5].into_iter().collect();
        store.save_seen_user_ids(&ids).unwrap();

        let raw = store.get_value("seenStoryUserIds").unwrap().unwrap();
        assert_eq!(raw, "[5]");
        assert!(store.get_value("likedStoryItemIds").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let store = SqliteStore::in_memory().unwrap();
        store.set_value(SEEN_USER_IDS_KEY, "not json").unwrap();
        assert!(matches!(
            store.load_seen_user_ids(),
            Err(StoryError::Json(_))
        ));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            let liked: HashSet<String> = ["7-2".to_string()].into_iter().collect();
            store.save_liked_item_ids(&liked).unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert!(reopened.load_liked_item_ids().unwrap().contains("7-2"));
    }
}
