//! Project storage operations (CRUD)

use crate::project::{Project, ProjectSettings};
use crate::storage::db::DatabaseError;
use crate::util::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Project record as stored in the `data` column (files live in their own table)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRecord {
    id: String,
    name: String,
    #[serde(default)]
    settings: ProjectSettings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectRecord {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            settings: p.settings,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProjectRecord> for Project {
    fn from(r: ProjectRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            files: Vec::new(),
            settings: r.settings,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Project storage operations
pub struct ProjectRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ProjectRepo<'a> {
    /// Create a new project repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or replace a project record
    ///
    /// The stored `created_at` column is never overwritten. Each write takes
    /// the next revision number, which orders projects saved within the same
    /// instant.
    ///
    /// # Errors
    /// Returns an error if the project cannot be written
    pub fn upsert(&self, project: &Project) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(&ProjectRecord::from(project))?;

        self.conn.execute(
            r"
            INSERT INTO projects (id, name, data, revision, created_at, updated_at)
            VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(revision), 0) + 1 FROM projects), ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                data = excluded.data,
                revision = excluded.revision,
                updated_at = excluded.updated_at
            ",
            params![
                project.id,
                project.name,
                json,
                format_timestamp(&project.created_at),
                format_timestamp(&project.updated_at),
            ],
        )?;

        Ok(())
    }

    /// Get a project by ID, without its files
    ///
    /// # Errors
    /// Returns an error if the project cannot be retrieved
    pub fn get(&self, id: &str) -> Result<Option<Project>, DatabaseError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM projects WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => {
                let record: ProjectRecord = serde_json::from_str(&json)?;
                Ok(Some(record.into()))
            }
            None => Ok(None),
        }
    }

    /// Get the stored creation time of a project
    ///
    /// # Errors
    /// Returns an error if the lookup fails
    pub fn created_at(&self, id: &str) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT created_at FROM projects WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|s| {
            parse_timestamp(&s).map_err(|e| DatabaseError::Corrupt(format!("Invalid datetime: {e}")))
        })
        .transpose()
    }

    /// Check whether a project exists
    ///
    /// # Errors
    /// Returns an error if the lookup fails
    pub fn exists(&self, id: &str) -> Result<bool, DatabaseError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM projects WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List all projects, most recently updated first
    ///
    /// # Errors
    /// Returns an error if the projects cannot be listed
    pub fn list(&self) -> Result<Vec<ProjectSummary>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT p.id, p.name, p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM files f WHERE f.project_id = p.id) AS file_count
            FROM projects p
            ORDER BY p.updated_at DESC, p.revision DESC
            ",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let name: String = row.get(1)?;
            let created_at: String = row.get(2)?;
            let updated_at: String = row.get(3)?;
            let file_count: i64 = row.get(4)?;

            Ok((id, name, created_at, updated_at, file_count))
        })?;

        let mut projects = Vec::new();
        for row in rows {
            let (id, name, created_at_str, updated_at_str, file_count) = row?;
            let created_at = parse_timestamp(&created_at_str)
                .map_err(|e| DatabaseError::Corrupt(format!("Invalid datetime: {e}")))?;
            let updated_at = parse_timestamp(&updated_at_str)
                .map_err(|e| DatabaseError::Corrupt(format!("Invalid datetime: {e}")))?;

            projects.push(ProjectSummary {
                id,
                name,
                file_count: usize::try_from(file_count).unwrap_or(0),
                created_at,
                updated_at,
            });
        }

        Ok(projects)
    }

    /// Refresh a project's update time after one of its files changed
    ///
    /// # Errors
    /// Returns an error if the record cannot be updated
    pub fn touch(&self, id: &str, at: &DateTime<Utc>) -> Result<bool, DatabaseError> {
        let Some(mut project) = self.get(id)? else {
            return Ok(false);
        };
        project.updated_at = *at;
        self.upsert(&project)?;
        Ok(true)
    }

    /// Delete a project record
    ///
    /// # Errors
    /// Returns an error if the project cannot be deleted
    pub fn delete(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;

        Ok(deleted > 0)
    }

    /// Delete every project record
    ///
    /// # Errors
    /// Returns an error if the table cannot be cleared
    pub fn clear(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM projects", [])?)
    }
}

/// Project summary (without files)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Unique identifier
    pub id: String,
    /// Project name
    pub name: String,
    /// Number of top-level files
    pub file_count: usize,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_upsert_keeps_created_at_column() {
        let db = Database::in_memory().unwrap();
        let repo = ProjectRepo::new(db.connection());

        let mut project = Project::new("Demo").with_id("p1");
        let original = project.created_at;
        repo.upsert(&project).unwrap();

        project.created_at = original + chrono::Duration::days(1);
        repo.upsert(&project).unwrap();

        assert_eq!(repo.created_at("p1").unwrap(), Some(original));
    }

    #[test]
    fn test_revision_increases_on_every_write() {
        let db = Database::in_memory().unwrap();
        let repo = ProjectRepo::new(db.connection());
        let revision = |id: &str| -> i64 {
            db.connection()
                .query_row(
                    "SELECT revision FROM projects WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .unwrap()
        };

        let a = Project::new("A").with_id("a");
        let b = Project::new("B").with_id("b");
        repo.upsert(&a).unwrap();
        repo.upsert(&b).unwrap();
        assert!(revision("b") > revision("a"));

        repo.upsert(&a).unwrap();
        assert!(revision("a") > revision("b"));
    }

    #[test]
    fn test_missing_project() {
        let db = Database::in_memory().unwrap();
        let repo = ProjectRepo::new(db.connection());

        assert!(repo.get("nope").unwrap().is_none());
        assert!(!repo.exists("nope").unwrap());
        assert!(!repo.delete("nope").unwrap());
        assert!(!repo.touch("nope", &crate::util::now()).unwrap());
    }
}
