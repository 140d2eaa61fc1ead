//! File storage operations
//!
//! Rows are keyed by file id and indexed by `(project_id, position)`, so
//! loading or deleting a project's files never scans the whole table.

use crate::file::FileNode;
use crate::storage::db::DatabaseError;
use crate::util::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Ownership and creation time of a stored file row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub project_id: String,
    pub created_at: DateTime<Utc>,
}

/// File storage operations
pub struct FileRepo<'a> {
    conn: &'a Connection,
}

impl<'a> FileRepo<'a> {
    /// Create a new file repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Look up which project owns a file and when it was created
    ///
    /// # Errors
    /// Returns an error if the lookup fails or the stored timestamp is invalid
    pub fn stored(&self, file_id: &str) -> Result<Option<StoredFile>, DatabaseError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT project_id, created_at FROM files WHERE id = ?1",
                params![file_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(project_id, created_at)| {
            let created_at = parse_timestamp(&created_at)
                .map_err(|e| DatabaseError::Corrupt(format!("Invalid datetime: {e}")))?;
            Ok(StoredFile {
                project_id,
                created_at,
            })
        })
        .transpose()
    }

    /// Insert or replace a top-level file of a project
    ///
    /// With `position` set, the file takes that slot in the project's order.
    /// Without it, a new file goes to the end and an existing file keeps its
    /// slot. A row owned by another project is never taken over, and the
    /// stored `created_at` column is kept.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn upsert(
        &self,
        project_id: &str,
        file: &FileNode,
        position: Option<usize>,
    ) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(file)?;
        let position = position.map(|p| i64::try_from(p).unwrap_or(i64::MAX));

        self.conn.execute(
            r"
            INSERT INTO files (id, project_id, name, position, data, created_at, updated_at)
            VALUES (
                ?1, ?2, ?3,
                COALESCE(?4, (SELECT COALESCE(MAX(position), -1) + 1 FROM files WHERE project_id = ?2)),
                ?5, ?6, ?7
            )
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                position = COALESCE(?4, files.position),
                data = excluded.data,
                updated_at = excluded.updated_at
            WHERE files.project_id = excluded.project_id
            ",
            params![
                file.id,
                project_id,
                file.name,
                position,
                json,
                format_timestamp(&file.created_at),
                format_timestamp(&file.updated_at),
            ],
        )?;

        Ok(())
    }

    /// Load a project's top-level files in display order
    ///
    /// # Errors
    /// Returns an error if the files cannot be read or decoded
    pub fn list_for_project(&self, project_id: &str) -> Result<Vec<FileNode>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT data FROM files
            WHERE project_id = ?1
            ORDER BY position, created_at
            ",
        )?;

        let rows = stmt.query_map(params![project_id], |row| row.get::<_, String>(0))?;

        let mut files = Vec::new();
        for row in rows {
            files.push(serde_json::from_str(&row?)?);
        }
        Ok(files)
    }

    /// Count a project's top-level files
    ///
    /// # Errors
    /// Returns an error if the count fails
    pub fn count_for_project(&self, project_id: &str) -> Result<usize, DatabaseError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM files WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Count every stored file
    ///
    /// # Errors
    /// Returns an error if the count fails
    pub fn count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Delete one file, only if it belongs to the given project
    ///
    /// # Errors
    /// Returns an error if the file cannot be deleted
    pub fn delete(&self, project_id: &str, file_id: &str) -> Result<bool, DatabaseError> {
        let deleted = self.conn.execute(
            "DELETE FROM files WHERE id = ?1 AND project_id = ?2",
            params![file_id, project_id],
        )?;
        Ok(deleted > 0)
    }

    /// Delete every file of a project
    ///
    /// # Errors
    /// Returns an error if the files cannot be deleted
    pub fn delete_for_project(&self, project_id: &str) -> Result<usize, DatabaseError> {
        Ok(self
            .conn
            .execute("DELETE FROM files WHERE project_id = ?1", params![project_id])?)
    }

    /// Delete every file
    ///
    /// # Errors
    /// Returns an error if the table cannot be cleared
    pub fn clear(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM files", [])?)
    }
}
