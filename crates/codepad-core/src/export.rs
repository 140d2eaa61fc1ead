//! Project export/import
//!
//! The transport format is the project itself as pretty-printed JSON, with
//! its files joined in. Import accepts that document and tolerates missing
//! identity fields, since those are regenerated anyway.

use crate::file::{FileKind, FileNode};
use crate::project::{Project, ProjectSettings};
use crate::util;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Not JSON, or not shaped like a project
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Parsed, but breaks a model rule
    #[error("{0}")]
    Invalid(String),
}

/// Serialize a project (with files) to the transport string
///
/// # Errors
/// Returns an error if serialization fails
pub fn to_transport(project: &Project) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(project)
}

/// Project as accepted on import
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedProject {
    name: String,
    #[serde(default)]
    files: Vec<ImportedFile>,
    #[serde(default)]
    settings: ProjectSettings,
}

/// File as accepted on import
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedFile {
    name: String,
    #[serde(rename = "type")]
    kind: FileKind,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    children: Vec<ImportedFile>,
    #[serde(default)]
    is_open: bool,
}

impl ImportedFile {
    fn materialize(self, at: DateTime<Utc>) -> FileNode {
        FileNode {
            id: util::new_id(),
            name: self.name,
            kind: self.kind,
            language: self.language,
            content: self.content,
            children: self
                .children
                .into_iter()
                .map(|c| c.materialize(at))
                .collect(),
            is_open: self.is_open,
            project_id: None,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Parse a transport string into a fresh project
///
/// The project and every file in its tree get new ids and timestamps;
/// names, content, tree shape and settings are kept as-is.
///
/// # Errors
/// Returns an error if the input is not a valid project document
pub fn from_transport(input: &str) -> Result<Project, ImportError> {
    let imported: ImportedProject = serde_json::from_str(input)?;
    let now = util::now();

    let project = Project {
        id: util::new_id(),
        name: imported.name,
        files: imported
            .files
            .into_iter()
            .map(|f| f.materialize(now))
            .collect(),
        settings: imported.settings,
        created_at: now,
        updated_at: now,
    };

    project.validate().map_err(ImportError::Invalid)?;
    Ok(project)
}
