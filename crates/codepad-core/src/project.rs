//! Projects and their editor settings

use crate::file::{validate_siblings, FileNode};
use crate::util;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editor color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}' (expected dark or light)")),
        }
    }
}

/// Per-project editor settings
///
/// Always complete; missing fields in serialized input take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    pub theme: Theme,
    pub font_size: u32,
    pub tab_size: u32,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            font_size: 14,
            tab_size: 2,
        }
    }
}

impl ProjectSettings {
    /// Shallow-merge a patch; unspecified fields keep their current value
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(tab_size) = patch.tab_size {
            self.tab_size = tab_size;
        }
    }

    /// Return a copy with the patch merged on top
    #[must_use]
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        self.merge(patch);
        self
    }

    /// # Errors
    /// Returns an error if a size is zero
    pub fn validate(&self) -> Result<(), String> {
        if self.font_size == 0 {
            return Err("fontSize must be a positive integer".to_string());
        }
        if self.tab_size == 0 {
            return Err("tabSize must be a positive integer".to_string());
        }
        Ok(())
    }
}

/// Partial settings update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_size: Option<u32>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.font_size.is_none() && self.tab_size.is_none()
    }
}

/// Partial project update
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// New display name
    pub name: Option<String>,
    /// Replacement file list
    pub files: Option<Vec<FileNode>>,
    /// Settings merged onto the stored ones
    pub settings: Option<SettingsPatch>,
}

/// A stored project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Top-level file tree nodes, in display order
    #[serde(default)]
    pub files: Vec<FileNode>,
    /// Editor settings
    #[serde(default)]
    pub settings: ProjectSettings,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create an empty project with default settings
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = util::now();

        Self {
            id: util::new_id(),
            name: name.into(),
            files: Vec::new(),
            settings: ProjectSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a project seeded with an HTML page, a stylesheet and a script
    #[must_use]
    pub fn starter(name: impl Into<String>) -> Self {
        Self::new(name).with_files(vec![
            FileNode::file("index.html", STARTER_HTML),
            FileNode::file("style.css", STARTER_CSS),
            FileNode::file("script.js", STARTER_JS),
        ])
    }

    /// Set the project id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the top-level files
    #[must_use]
    pub fn with_files(mut self, files: Vec<FileNode>) -> Self {
        self.files = files;
        self
    }

    /// Set the settings
    #[must_use]
    pub fn with_settings(mut self, settings: ProjectSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Find a file anywhere in the tree
    #[must_use]
    pub fn find_file(&self, id: &str) -> Option<&FileNode> {
        self.files.iter().find_map(|f| f.find(id))
    }

    /// Apply a partial update in memory
    pub fn apply(&mut self, update: ProjectUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(files) = update.files {
            self.files = files;
        }
        if let Some(patch) = update.settings {
            self.settings.merge(&patch);
        }
    }

    /// # Errors
    /// Returns a description of the first violation found
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("project id must not be empty".to_string());
        }
        self.settings.validate()?;
        validate_siblings(&self.files)
    }
}

const STARTER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hello World</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <div class="container">
        <h1>Hello World!</h1>
        <button onclick="showAlert()">Click</button>
    </div>
    <script src="script.js"></script>
</body>
</html>
"#;

const STARTER_CSS: &str = r"body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0;
    padding: 20px;
}

.container {
    max-width: 600px;
    margin: 0 auto;
    text-align: center;
}
";

const STARTER_JS: &str = r"function showAlert() {
    alert('Hello from codepad!');
}
";
