//! Project store
//!
//! The one entry point for persisting projects, their files and global
//! settings. A `ProjectStore` is a cheap handle: clone it and hand it to
//! whatever needs storage. The database opens lazily on first use.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::export::{self, ImportError};
use crate::file::{validate_siblings, FileNode};
use crate::project::{Project, ProjectSettings, ProjectUpdate, SettingsPatch};
use crate::storage::{Database, DatabaseError, FileRepo, ProjectRepo, ProjectSummary, SettingRepo};
use crate::util;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Persistent store for projects, files and settings
#[derive(Clone)]
pub struct ProjectStore {
    location: Location,
    defaults: ProjectSettings,
    /// Opened on first use; the lock serializes every operation
    db: Arc<Mutex<Option<Database>>>,
}

impl ProjectStore {
    /// Create a store backed by the configured database file
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            location: Location::File(config.database_path()),
            defaults: config.defaults,
            db: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a store backed by a private in-memory database
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            defaults: ProjectSettings::default(),
            db: Arc::new(Mutex::new(None)),
        }
    }

    /// Settings given to projects made by [`ProjectStore::create_project`]
    #[must_use]
    pub fn with_defaults(mut self, defaults: ProjectSettings) -> Self {
        self.defaults = defaults;
        self
    }

    /// Open the database if it is not open yet
    ///
    /// Safe to call repeatedly; later calls reuse the open connection.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the database cannot be opened
    pub async fn initialize(&self) -> StoreResult<()> {
        self.with_db(|_| Ok(()))
    }

    /// Whether the database has been opened
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.db
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Save a project and all of its top-level files in one transaction
    ///
    /// Refreshes `updatedAt` on the project and on each file, stamps each
    /// file with the project id, and keeps the stored `createdAt` of an
    /// existing project and file. Files stored earlier but missing from
    /// `project.files` are left in place. Returns the project as stored.
    ///
    /// # Errors
    /// Returns `Invalid` if the project breaks a model rule, reuses a file id
    /// of another project, or leaves two top-level files with one name;
    /// `WriteFailed` if the write fails. Nothing is written on error.
    pub async fn save_project(&self, mut project: Project) -> StoreResult<Project> {
        project.validate().map_err(StoreError::Invalid)?;

        self.with_db(|db| {
            let tx = db.transaction().map_err(StoreError::write)?;
            persist_project(&tx, &mut project)?;
            tx.commit()
                .map_err(|e| StoreError::write(DatabaseError::from(e)))
        })?;

        tracing::debug!(project = %project.id, files = project.files.len(), "saved project");
        Ok(project)
    }

    /// Get a project with its files, or `None` if it does not exist
    ///
    /// # Errors
    /// Returns `ReadFailed` if the database read fails
    pub async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        self.with_db(|db| load_project(db.connection(), id).map_err(StoreError::read))
    }

    /// List project summaries, most recently updated first
    ///
    /// Files are not loaded; use [`ProjectStore::get_project`] for those.
    ///
    /// # Errors
    /// Returns `ReadFailed` if the database read fails
    pub async fn list_projects(&self) -> StoreResult<Vec<ProjectSummary>> {
        self.with_db(|db| {
            ProjectRepo::new(db.connection())
                .list()
                .map_err(StoreError::read)
        })
    }

    /// Delete a project and every file belonging to it
    ///
    /// Returns whether a project was removed; deleting a missing project
    /// is not an error.
    ///
    /// # Errors
    /// Returns `WriteFailed` if the delete fails (nothing is deleted)
    pub async fn delete_project(&self, id: &str) -> StoreResult<bool> {
        let (deleted, files) = self.with_db(|db| {
            let tx = db.transaction().map_err(StoreError::write)?;
            let files = FileRepo::new(&tx)
                .delete_for_project(id)
                .map_err(StoreError::write)?;
            let deleted = ProjectRepo::new(&tx).delete(id).map_err(StoreError::write)?;
            tx.commit()
                .map_err(|e| StoreError::write(DatabaseError::from(e)))?;
            Ok((deleted, files))
        })?;

        if deleted {
            tracing::info!(project = %id, files, "deleted project");
        }
        Ok(deleted)
    }

    /// Create a project from the configured defaults plus a settings patch
    ///
    /// # Errors
    /// Returns `Invalid` if the merged settings are invalid, or
    /// `WriteFailed` if the write fails
    pub async fn create_project(
        &self,
        name: &str,
        files: Vec<FileNode>,
        settings: &SettingsPatch,
    ) -> StoreResult<Project> {
        let project = Project::new(name)
            .with_files(files)
            .with_settings(self.defaults.merged(settings));
        self.save_project(project).await
    }

    /// Apply a partial update to a stored project
    ///
    /// Settings are merged field by field onto the stored ones. A
    /// replacement file list drops stored files that are not in it.
    ///
    /// # Errors
    /// Returns `NotFound` if the project does not exist, `Invalid` if the
    /// result breaks a model rule, or `ReadFailed`/`WriteFailed`
    pub async fn update_project(&self, id: &str, update: ProjectUpdate) -> StoreResult<Project> {
        let replace_files = update.files.is_some();

        let project = self.with_db(|db| {
            let tx = db.transaction().map_err(StoreError::write)?;

            let mut project = load_project(&tx, id)
                .map_err(StoreError::read)?
                .ok_or_else(|| StoreError::project_not_found(id))?;
            project.apply(update);
            project.validate().map_err(StoreError::Invalid)?;

            if replace_files {
                FileRepo::new(&tx)
                    .delete_for_project(id)
                    .map_err(StoreError::write)?;
            }
            persist_project(&tx, &mut project)?;
            tx.commit()
                .map_err(|e| StoreError::write(DatabaseError::from(e)))?;
            Ok(project)
        })?;

        tracing::debug!(project = %id, "updated project");
        Ok(project)
    }

    /// Save a single top-level file of a project
    ///
    /// Stamps the project id and a fresh `updatedAt` on the file and on the
    /// project. A new file is appended to the project's file order; an
    /// existing one keeps its slot and `createdAt`.
    ///
    /// # Errors
    /// Returns `NotFound` if the project does not exist, `Invalid` if the
    /// file breaks a model rule, belongs to another project or repeats a
    /// top-level name, or `WriteFailed`
    pub async fn save_file(&self, project_id: &str, mut file: FileNode) -> StoreResult<FileNode> {
        file.validate().map_err(StoreError::Invalid)?;

        self.with_db(|db| {
            let tx = db.transaction().map_err(StoreError::write)?;
            let projects = ProjectRepo::new(&tx);
            if !projects.exists(project_id).map_err(StoreError::read)? {
                return Err(StoreError::project_not_found(project_id));
            }

            let files = FileRepo::new(&tx);
            claim_file(&files, project_id, &mut file)?;
            let now = util::now();
            file.assign_project(project_id);
            file.updated_at = now;
            files
                .upsert(project_id, &file, None)
                .map_err(StoreError::write)?;
            check_sibling_names(&files, project_id)?;
            projects.touch(project_id, &now).map_err(StoreError::write)?;
            tx.commit()
                .map_err(|e| StoreError::write(DatabaseError::from(e)))
        })?;

        tracing::debug!(project = %project_id, file = %file.id, "saved file");
        Ok(file)
    }

    /// Delete a file of a project
    ///
    /// Only removes the file if it belongs to `project_id`. Returns whether
    /// a file was removed; a missing file is not an error.
    ///
    /// # Errors
    /// Returns `WriteFailed` if the delete fails
    pub async fn delete_file(&self, project_id: &str, file_id: &str) -> StoreResult<bool> {
        let deleted = self.with_db(|db| {
            let tx = db.transaction().map_err(StoreError::write)?;
            let deleted = FileRepo::new(&tx)
                .delete(project_id, file_id)
                .map_err(StoreError::write)?;
            if deleted {
                ProjectRepo::new(&tx)
                    .touch(project_id, &util::now())
                    .map_err(StoreError::write)?;
            }
            tx.commit()
                .map_err(|e| StoreError::write(DatabaseError::from(e)))?;
            Ok(deleted)
        })?;

        tracing::debug!(project = %project_id, file = %file_id, deleted, "deleted file");
        Ok(deleted)
    }

    /// Store a setting under `key`, replacing any previous value
    ///
    /// # Errors
    /// Returns `MalformedData` if the value cannot be serialized, or
    /// `WriteFailed`
    pub async fn save_setting<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        let value =
            serde_json::to_value(value).map_err(|e| StoreError::MalformedData(e.to_string()))?;
        self.with_db(|db| {
            SettingRepo::new(db.connection())
                .put(key, &value)
                .map_err(StoreError::write)
        })
    }

    /// Read a setting, or `default` if it is not stored
    ///
    /// # Errors
    /// Returns `MalformedData` if the stored value does not decode as `T`,
    /// or `ReadFailed`
    pub async fn get_setting<T>(&self, key: &str, default: T) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        let stored = self.with_db(|db| {
            SettingRepo::new(db.connection())
                .get(key)
                .map_err(StoreError::read)
        })?;

        match stored {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StoreError::MalformedData(format!("setting '{key}': {e}"))),
            None => Ok(default),
        }
    }

    /// List every stored setting ordered by key
    ///
    /// # Errors
    /// Returns `ReadFailed`
    pub async fn list_settings(&self) -> StoreResult<Vec<(String, Value)>> {
        self.with_db(|db| {
            SettingRepo::new(db.connection())
                .list()
                .map_err(StoreError::read)
        })
    }

    /// Remove a setting; returns whether it existed
    ///
    /// # Errors
    /// Returns `WriteFailed`
    pub async fn delete_setting(&self, key: &str) -> StoreResult<bool> {
        self.with_db(|db| {
            SettingRepo::new(db.connection())
                .delete(key)
                .map_err(StoreError::write)
        })
    }

    /// Serialize a project and its files to a transport string
    ///
    /// # Errors
    /// Returns `NotFound` if the project does not exist, or `ReadFailed`
    pub async fn export_project(&self, id: &str) -> StoreResult<String> {
        let project = self
            .get_project(id)
            .await?
            .ok_or_else(|| StoreError::project_not_found(id))?;

        export::to_transport(&project).map_err(|e| StoreError::MalformedData(e.to_string()))
    }

    /// Import a transport string as a new project
    ///
    /// The project and all of its files get fresh ids and timestamps.
    ///
    /// # Errors
    /// Returns `MalformedData` if the input is not a valid project, or
    /// `WriteFailed`
    pub async fn import_project(&self, serialized: &str) -> StoreResult<Project> {
        let project = export::from_transport(serialized).map_err(|e| match e {
            ImportError::Json(e) => StoreError::MalformedData(e.to_string()),
            ImportError::Invalid(msg) => StoreError::MalformedData(msg),
        })?;

        let project = self.save_project(project).await?;
        tracing::info!(project = %project.id, name = %project.name, "imported project");
        Ok(project)
    }

    /// Delete every project, file and setting in one transaction
    ///
    /// # Errors
    /// Returns `WriteFailed` if the reset fails (nothing is deleted)
    pub async fn clear_all(&self) -> StoreResult<()> {
        let (projects, files, settings) = self.with_db(|db| {
            let tx = db.transaction().map_err(StoreError::write)?;
            let files = FileRepo::new(&tx).clear().map_err(StoreError::write)?;
            let projects = ProjectRepo::new(&tx).clear().map_err(StoreError::write)?;
            let settings = SettingRepo::new(&tx).clear().map_err(StoreError::write)?;
            tx.commit()
                .map_err(|e| StoreError::write(DatabaseError::from(e)))?;
            Ok((projects, files, settings))
        })?;

        tracing::info!(projects, files, settings, "cleared all data");
        Ok(())
    }

    fn open(&self) -> StoreResult<Database> {
        let db = match &self.location {
            Location::File(path) => Database::open(path),
            Location::Memory => Database::in_memory(),
        };
        db.map_err(|e| {
            tracing::error!(error = %e, "failed to open project database");
            StoreError::StorageUnavailable(e)
        })
    }

    /// Run `f` against the open database, opening it first if needed
    fn with_db<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Database) -> StoreResult<T>,
    {
        // Handle mutex poisoning by recovering the lock
        let mut guard = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        let db = match guard.take() {
            Some(db) => db,
            None => self.open()?,
        };
        f(guard.insert(db))
    }
}

/// Load a project record and join its files
fn load_project(conn: &Connection, id: &str) -> Result<Option<Project>, DatabaseError> {
    let Some(mut project) = ProjectRepo::new(conn).get(id)? else {
        return Ok(None);
    };
    project.files = FileRepo::new(conn).list_for_project(id)?;
    Ok(Some(project))
}

/// Write a project record and its files, refreshing timestamps in place
fn persist_project(conn: &Connection, project: &mut Project) -> StoreResult<()> {
    let projects = ProjectRepo::new(conn);
    let now = util::now();

    if let Some(created_at) = projects.created_at(&project.id).map_err(StoreError::read)? {
        project.created_at = created_at;
    }
    project.updated_at = now;
    projects.upsert(project).map_err(StoreError::write)?;

    let files = FileRepo::new(conn);
    for (position, file) in project.files.iter_mut().enumerate() {
        claim_file(&files, &project.id, file)?;
        file.assign_project(&project.id);
        file.updated_at = now;
        files
            .upsert(&project.id, file, Some(position))
            .map_err(StoreError::write)?;
    }
    check_sibling_names(&files, &project.id)
}

/// Reject a file id stored under another project; otherwise keep its creation time
fn claim_file(files: &FileRepo<'_>, project_id: &str, file: &mut FileNode) -> StoreResult<()> {
    if let Some(stored) = files.stored(&file.id).map_err(StoreError::read)? {
        if stored.project_id != project_id {
            return Err(StoreError::Invalid(format!(
                "file '{}' belongs to another project",
                file.id
            )));
        }
        file.created_at = stored.created_at;
    }
    Ok(())
}

/// Stored top-level files of a project must still have unique names
fn check_sibling_names(files: &FileRepo<'_>, project_id: &str) -> StoreResult<()> {
    let stored = files
        .list_for_project(project_id)
        .map_err(StoreError::read)?;
    validate_siblings(&stored).map_err(StoreError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = ProjectStore::in_memory();
        assert!(!store.is_initialized());

        store.initialize().await.unwrap();
        store
            .save_project(Project::new("Kept").with_id("p1"))
            .await
            .unwrap();
        store.initialize().await.unwrap();

        assert!(store.get_project("p1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lazy_initialization() {
        let store = ProjectStore::in_memory();
        assert!(store.list_projects().await.unwrap().is_empty());
        assert!(store.is_initialized());
    }

    #[tokio::test]
    async fn test_clones_share_database() {
        let store = ProjectStore::in_memory();
        let other = store.clone();

        store.save_setting("k", &1).await.unwrap();
        assert_eq!(other.get_setting("k", 0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let config = StoreConfig::default().with_database_path(blocker.join("codepad.db"));
        let store = ProjectStore::new(&config);

        let err = store.initialize().await.unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
        assert!(!store.is_initialized());
    }
}
