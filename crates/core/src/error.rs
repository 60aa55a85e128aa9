//! Error types for CardMap
//!
//! This module provides unified error handling across the workspace:
//! connector contract violations, lookups of missing cards and edges,
//! document IO and serialization failures, and configuration problems.

use crate::types::{CardId, ConnectorId, EdgeId};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for CardMap
#[derive(Debug, Error)]
pub enum MapError {
    // ========================================================================
    // Contract Violations
    // ========================================================================
    /// A card notified a connector that is not bound to it
    #[error("Card {card} is not an endpoint of connector {connector}")]
    NotAnEndpoint { card: CardId, connector: ConnectorId },

    /// A connector was constructed from an impossible combination of arguments
    #[error("Invalid connector construction: {0}")]
    InvalidConstruction(String),

    /// Operation is not allowed in the connector's current state
    #[error("Connector {connector} cannot {action} while {state}")]
    InvalidState {
        connector: ConnectorId,
        action: &'static str,
        state: &'static str,
    },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Card not found on the canvas or in the document
    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    /// Edge not found in the document
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Connector not found on the canvas
    #[error("Connector not found: {0}")]
    ConnectorNotFound(ConnectorId),

    /// Document file not found
    #[error("Document not found at path: {0}")]
    DocumentNotFound(PathBuf),

    // ========================================================================
    // Document Errors
    // ========================================================================
    /// Document consistency check failed
    #[error("Document validation failed: {0}")]
    Validation(String),

    /// Duplicate card id
    #[error("Duplicate card: {0} already exists")]
    DuplicateCard(CardId),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MapError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        MapError::Validation(msg.into())
    }

    /// Create an invalid construction error
    pub fn invalid_construction(msg: impl Into<String>) -> Self {
        MapError::InvalidConstruction(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        MapError::InvalidConfig(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        MapError::Internal(msg.into())
    }

    /// Check if this error is a programming-contract violation
    ///
    /// These indicate subscription bookkeeping bugs rather than runtime
    /// conditions.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            MapError::NotAnEndpoint { .. }
                | MapError::InvalidConstruction(_)
                | MapError::InvalidState { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MapError::CardNotFound(_)
                | MapError::EdgeNotFound(_)
                | MapError::ConnectorNotFound(_)
                | MapError::DocumentNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            MapError::Io(_)
                | MapError::FileRead { .. }
                | MapError::FileWrite { .. }
                | MapError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using MapError
pub type MapResult<T> = Result<T, MapError>;

// ============================================================================
// Tests
// ============================================================================
