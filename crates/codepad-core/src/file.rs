//! File tree nodes

use crate::util;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Kind of file tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::File => write!(f, "file"),
            FileKind::Folder => write!(f, "folder"),
        }
    }
}

/// A file or folder in a project's tree
///
/// Top-level nodes are stored as individual records; a folder's children
/// live inside the folder's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// Unique identifier
    pub id: String,
    /// Name, unique among siblings
    pub name: String,
    /// File or folder
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Editor language (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Text content (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Child nodes (folders only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
    /// Whether the folder is expanded in the tree view
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_open: bool,
    /// Owning project, stamped by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl FileNode {
    /// Create a file node, inferring its language from the name
    #[must_use]
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let language = language_for_name(&name).map(str::to_string);
        let mut node = Self::blank(name, FileKind::File);
        node.language = language;
        node.content = Some(content.into());
        node
    }

    /// Create an empty, collapsed folder node
    #[must_use]
    pub fn folder(name: impl Into<String>) -> Self {
        Self::blank(name.into(), FileKind::Folder)
    }

    fn blank(name: String, kind: FileKind) -> Self {
        let now = util::now();
        Self {
            id: util::new_id(),
            name,
            kind,
            language: None,
            content: None,
            children: Vec::new(),
            is_open: false,
            project_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the node id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the inferred language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Add a child (folders only; checked by [`FileNode::validate`])
    #[must_use]
    pub fn with_child(mut self, child: FileNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == FileKind::Folder
    }

    /// Stamp ownership on this node and its descendants
    pub(crate) fn assign_project(&mut self, project_id: &str) {
        self.project_id = Some(project_id.to_string());
        for child in &mut self.children {
            child.assign_project(project_id);
        }
    }

    /// Depth-first search by id, including this node
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&FileNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Visit this node and every descendant, depth-first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a FileNode)) {
        visit(self);
        for child in &self.children {
            child.walk(&mut *visit);
        }
    }

    /// Check kind-specific fields and sibling name uniqueness
    ///
    /// # Errors
    /// Returns a description of the first violation found
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("file {} has an empty name", self.id));
        }
        match self.kind {
            FileKind::File => {
                if !self.children.is_empty() {
                    return Err(format!("file '{}' cannot have children", self.name));
                }
            }
            FileKind::Folder => {
                if self.content.is_some() || self.language.is_some() {
                    return Err(format!(
                        "folder '{}' cannot have content or language",
                        self.name
                    ));
                }
                validate_siblings(&self.children)?;
            }
        }
        Ok(())
    }
}

/// Validate a list of sibling nodes and everything below them
///
/// # Errors
/// Returns a description of the first violation found
pub fn validate_siblings(nodes: &[FileNode]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.name.as_str()) {
            return Err(format!("duplicate name '{}' among siblings", node.name));
        }
        node.validate()?;
    }
    Ok(())
}

/// Editor language for a file name, by extension
#[must_use]
pub fn language_for_name(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let language = match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "html",
        "css" => "css",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "json" => "json",
        "md" | "markdown" => "markdown",
        "py" => "python",
        "rs" => "rust",
        _ => return None,
    };
    Some(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_inference() {
        assert_eq!(language_for_name("index.html"), Some("html"));
        assert_eq!(language_for_name("app.JS"), Some("javascript"));
        assert_eq!(language_for_name("README.md"), Some("markdown"));
        assert_eq!(language_for_name("Makefile"), None);
        assert_eq!(language_for_name("archive.tar.zz"), None);
    }

    #[test]
    fn test_file_constructor() {
        let f = FileNode::file("style.css", "body {}");
        assert_eq!(f.kind, FileKind::File);
        assert_eq!(f.language.as_deref(), Some("css"));
        assert_eq!(f.content.as_deref(), Some("body {}"));
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_serialized_field_names() {
        let folder = FileNode::folder("src")
            .with_id("d1")
            .with_child(FileNode::file("main.js", "").with_id("f1"));
        let value = serde_json::to_value(&folder).unwrap();

        assert_eq!(value["type"], "folder");
        assert_eq!(value["children"][0]["type"], "file");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("content").is_none());
        assert!(value.get("isOpen").is_none());
    }

    #[test]
    fn test_duplicate_sibling_names_rejected() {
        let folder = FileNode::folder("src")
            .with_child(FileNode::file("a.js", ""))
            .with_child(FileNode::file("a.js", ""));
        let err = folder.validate().unwrap_err();
        assert!(err.contains("duplicate name 'a.js'"));
    }

    #[test]
    fn test_same_name_in_different_folders_allowed() {
        let nodes = vec![
            FileNode::folder("a").with_child(FileNode::file("index.js", "")),
            FileNode::folder("b").with_child(FileNode::file("index.js", "")),
        ];
        assert!(validate_siblings(&nodes).is_ok());
    }

    #[test]
    fn test_file_with_children_rejected() {
        let file = FileNode::file("a.js", "").with_child(FileNode::file("b.js", ""));
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_find_and_walk() {
        let tree = FileNode::folder("root")
            .with_id("r")
            .with_child(FileNode::folder("src").with_id("s").with_child(
                FileNode::file("main.ts", "").with_id("m"),
            ));

        assert_eq!(tree.find("m").map(|n| n.name.as_str()), Some("main.ts"));
        assert!(tree.find("missing").is_none());

        let mut names = Vec::new();
        tree.walk(&mut |n| names.push(n.name.as_str()));
        assert_eq!(names, vec!["root", "src", "main.ts"]);
    }
}
