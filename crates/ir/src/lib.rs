//! # CardMap IR (document model)
//!
//! This crate provides the persisted model behind a CardMap canvas: the
//! cards, the directed edges between them, and the document that owns both.
//!
//! ## Core Concepts
//!
//! - **Card**: a rectangular node of the diagram
//! - **Edge**: a directed link from one card to another
//! - **Document**: the root container, and the `DocumentHandle` connectors
//!   commit through
//!

// Module declarations
pub mod card;
pub mod document;
pub mod edge;
pub mod serialization;

// Re-export commonly used types at crate root
pub use card::Card;
pub use document::{Document, DocumentMeta};
pub use edge::Edge;
pub use serialization::{
    DocumentFile, ensure_extension, load_document, load_document_from_string, save_document,
    save_document_to_string,
};

// Re-export core types that are commonly used with IR
pub use cardmap_core::{
    CardId, DocumentHandle, EdgeId, End, MapError, MapResult, Position, Rect, Size, Validatable,
};

/// Current schema version for document files
pub const SCHEMA_VERSION: u32 = 1;

/// File extension for CardMap document files
pub const DOCUMENT_FILE_EXTENSION: &str = "cmap";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(DOCUMENT_FILE_EXTENSION, "cmap");
    }
}
