//! Serialization and deserialization for CardMap documents
//!
//! This module provides functionality for saving and loading document files,
//! including JSON serialization, file I/O, and schema version checks.

use crate::{DOCUMENT_FILE_EXTENSION, Document, SCHEMA_VERSION};
use cardmap_core::{MapError, MapResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Document File Wrapper
// ============================================================================

/// Wrapper for document files that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Schema version for migration purposes
    pub schema_version: u32,

    /// The document data
    pub document: Document,
}

impl DocumentFile {
    /// Wrap a document for writing
    pub fn new(document: Document) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            document,
        }
    }

    /// Check if migration is needed
    pub fn needs_migration(&self) -> bool {
        self.schema_version < SCHEMA_VERSION
    }

    /// Bring an older file up to the current schema
    pub fn migrate(&mut self) -> MapResult<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(MapError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        // Version 1 is the first schema; nothing to convert yet.
        self.schema_version = SCHEMA_VERSION;
        Ok(())
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a document to a file
///
/// # Example
///
/// ```rust,ignore
/// use cardmap_ir::{Document, save_document};
///
/// let document = Document::new("Plans");
/// save_document(&document, "plans.cmap").unwrap();
/// ```
pub fn save_document(document: &Document, path: impl AsRef<Path>) -> MapResult<()> {
    let path = path.as_ref();
    let json = save_document_to_string(document).map_err(|e| MapError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize document: {}", e),
    })?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| MapError::DirectoryCreate {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| MapError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), "Saved document");
    Ok(())
}

/// Save a document to a JSON string
pub fn save_document_to_string(document: &Document) -> MapResult<String> {
    let file = DocumentFile::new(document.clone());
    Ok(serde_json::to_string_pretty(&file)?)
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a document from a file
pub fn load_document(path: impl AsRef<Path>) -> MapResult<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MapError::DocumentNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| MapError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    load_document_from_string(&json).map_err(|e| match e {
        MapError::JsonSerialization(je) => MapError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid document file format: {}", je),
        },
        other => other,
    })
}

/// Load a document from a JSON string
pub fn load_document_from_string(json: &str) -> MapResult<Document> {
    let mut file: DocumentFile = serde_json::from_str(json)?;
    if file.schema_version != SCHEMA_VERSION {
        file.migrate()?;
    }
    Ok(file.document)
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Ensure a path has the document extension
pub fn ensure_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.extension().is_none_or(|e| e != DOCUMENT_FILE_EXTENSION) {
        let mut new_path = path.to_path_buf();
        new_path.set_extension(DOCUMENT_FILE_EXTENSION);
        new_path
    } else {
        path.to_path_buf()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Card;
    use cardmap_core::DocumentHandle;
    use tempfile::tempdir;

    fn sample_document() -> Document {
        let mut doc = Document::new("Sample");
        let a = doc.add_card(Card::new("A").at(0.0, 0.0));
        let b = doc.add_card(Card::new("B").at(200.0, 0.0));
        doc.create_edge(a, b).unwrap();
        doc
    }

    #[test]
    fn test_string_round_trip_keeps_edges() {
        let doc = sample_document();
        let json = save_document_to_string(&doc).unwrap();
        assert!(json.contains("\"schema_version\": 1"));

        let loaded = load_document_from_string(&json).unwrap();
        assert_eq!(loaded.card_count(), 2);
        let edge = loaded.edges().next().unwrap();
        assert!(loaded.get_card(edge.orig).is_some());
        assert!(loaded.get_card(edge.dest).is_some());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let doc = sample_document();
        let json = save_document_to_string(&doc)
            .unwrap()
            .replace("\"schema_version\": 1", "\"schema_version\": 99");
        let err = load_document_from_string(&json).unwrap_err();
        assert!(matches!(
            err,
            MapError::SchemaVersionMismatch { expected: 1, found: 99 }
        ));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("map.cmap");
        save_document(&sample_document(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_document(dir.path().join("missing.cmap")).unwrap_err();
        assert!(matches!(err, MapError::DocumentNotFound(_)));
    }

    #[test]
    fn test_load_garbage_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.cmap");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, MapError::FileRead { .. }));
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(ensure_extension("map"), PathBuf::from("map.cmap"));
        assert_eq!(ensure_extension("map.cmap"), PathBuf::from("map.cmap"));
        assert_eq!(ensure_extension("map.json"), PathBuf::from("map.cmap"));
    }
}
