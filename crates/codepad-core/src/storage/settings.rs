//! Key-value settings storage

use crate::storage::db::DatabaseError;
use crate::util::{format_timestamp, now};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Settings storage operations
pub struct SettingRepo<'a> {
    conn: &'a Connection,
}

impl<'a> SettingRepo<'a> {
    /// Create a new settings repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or replace a setting
    ///
    /// # Errors
    /// Returns an error if the setting cannot be written
    pub fn put(&self, key: &str, value: &Value) -> Result<(), DatabaseError> {
        self.conn.execute(
            r"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, serde_json::to_string(value)?, format_timestamp(&now())],
        )?;
        Ok(())
    }

    /// Get a setting value
    ///
    /// # Errors
    /// Returns an error if the setting cannot be read or decoded
    pub fn get(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|s| serde_json::from_str::<Value>(&s)).transpose()?)
    }

    /// List all settings ordered by key
    ///
    /// # Errors
    /// Returns an error if the settings cannot be read or decoded
    pub fn list(&self) -> Result<Vec<(String, Value)>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut settings = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            settings.push((key, serde_json::from_str(&raw)?));
        }
        Ok(settings)
    }

    /// Delete a setting
    ///
    /// # Errors
    /// Returns an error if the setting cannot be deleted
    pub fn delete(&self, key: &str) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    /// Delete every setting
    ///
    /// # Errors
    /// Returns an error if the table cannot be cleared
    pub fn clear(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM settings", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use serde_json::json;

    #[test]
    fn test_put_get_overwrite() {
        let db = Database::in_memory().unwrap();
        let repo = SettingRepo::new(db.connection());

        repo.put("editor.wrap", &json!(true)).unwrap();
        repo.put("editor.wrap", &json!({"mode": "soft"})).unwrap();

        assert_eq!(repo.get("editor.wrap").unwrap(), Some(json!({"mode": "soft"})));
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let db = Database::in_memory().unwrap();
        let repo = SettingRepo::new(db.connection());

        assert_eq!(repo.get("absent").unwrap(), None);
        assert!(!repo.delete("absent").unwrap());
    }
}
