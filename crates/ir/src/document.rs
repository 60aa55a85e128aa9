//! Document definitions for CardMap
//!
//! This module contains the root `Document`, the container for all cards
//! and edges of one diagram, and its metadata. The document is the handle
//! connectors create, retarget, and delete their edges through.

use crate::serialization::save_document;
use crate::{Card, Edge};
use cardmap_core::{
    CardId, DocumentHandle, EdgeId, End, MapError, MapResult, Position, Rect, Validatable,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

// ============================================================================
// Document
// ============================================================================

/// Root container for one diagram
///
/// The `Document` holds every card and edge. It serializes to JSON for
/// persistence; the backing path and the commit counter are runtime-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub meta: DocumentMeta,

    /// All cards, keyed by ID
    pub cards: HashMap<Uuid, Card>,

    /// All edges between cards, keyed by ID
    pub edges: HashMap<Uuid, Edge>,

    /// File the document is committed to, if any
    #[serde(skip)]
    path: Option<PathBuf>,

    /// Number of commits since the document was created or opened
    #[serde(skip)]
    revision: u64,
}

impl Document {
    /// Create a new, empty document with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: DocumentMeta::new(name),
            cards: HashMap::new(),
            edges: HashMap::new(),
            path: None,
            revision: 0,
        }
    }

    /// Load a document from disk and commit back to the same file
    pub fn open(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let mut document = crate::serialization::load_document(path)?;
        document.path = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            cards = document.card_count(),
            edges = document.edge_count(),
            "Opened document"
        );
        Ok(document)
    }

    /// Builder: commit to the given file
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set or clear the backing file
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// Number of successful commits
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ========================================================================
    // Card Management
    // ========================================================================

    /// Add a card to the document
    pub fn add_card(&mut self, card: Card) -> Uuid {
        let id = card.id;
        self.cards.insert(id, card);
        self.touch();
        id
    }

    /// Remove a card by ID, along with every edge that references it
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let edges_to_remove: Vec<Uuid> = self
            .edges
            .values()
            .filter(|e| e.involves(id))
            .map(|e| e.id)
            .collect();

        for edge_id in edges_to_remove {
            tracing::debug!(%edge_id, card = %id, "Removing edge of deleted card");
            self.edges.remove(&edge_id);
        }

        self.touch();
        self.cards.remove(&id)
    }

    /// Get a card by ID
    pub fn get_card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Get a mutable card by ID
    pub fn get_card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(&id)
    }

    /// Get a card by its title
    pub fn get_card_by_title(&self, title: &str) -> Option<&Card> {
        self.cards.values().find(|c| c.title == title)
    }

    /// Replace a card's bounds
    pub fn move_card(&mut self, id: CardId, rect: Rect) -> MapResult<()> {
        let card = self.cards.get_mut(&id).ok_or(MapError::CardNotFound(id))?;
        card.set_rect(rect);
        self.touch();
        Ok(())
    }

    /// All cards, bottom-most first
    ///
    /// Ties on z-index are broken by creation time and then ID so the order
    /// is stable across loads.
    pub fn cards_in_z_order(&self) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self.cards.values().collect();
        cards.sort_by(|a, b| {
            a.z_index
                .cmp(&b.z_index)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        cards
    }

    /// Get the number of cards
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Highest z-index in use
    pub fn max_z_index(&self) -> i32 {
        self.cards.values().map(|c| c.z_index).max().unwrap_or(0)
    }

    /// Topmost card containing the position
    pub fn card_at(&self, position: Position) -> Option<&Card> {
        self.cards_in_z_order()
            .into_iter()
            .rev()
            .find(|c| c.contains(position))
    }

    // ========================================================================
    // Edge Management
    // ========================================================================

    /// Add an edge to the document
    pub fn add_edge(&mut self, edge: Edge) -> Uuid {
        let id = edge.id;
        self.edges.insert(id, edge);
        self.touch();
        id
    }

    /// Remove an edge by ID
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let removed = self.edges.remove(&id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Get all edges touching a card
    pub fn edges_for_card(&self, card: CardId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.involves(card)).collect()
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ========================================================================
    // Utility
    // ========================================================================

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.meta.modified_at = Utc::now();
    }

    /// Check if the document has no cards
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl DocumentHandle for Document {
    fn create_edge(&mut self, orig: CardId, dest: CardId) -> MapResult<EdgeId> {
        for card in [orig, dest] {
            if !self.cards.contains_key(&card) {
                return Err(MapError::CardNotFound(card));
            }
        }

        let id = self.add_edge(Edge::new(orig, dest));
        tracing::debug!(edge = %id, %orig, %dest, "Created edge");
        Ok(id)
    }

    fn set_edge_endpoint(&mut self, edge: EdgeId, end: End, card: CardId) -> MapResult<()> {
        if !self.cards.contains_key(&card) {
            return Err(MapError::CardNotFound(card));
        }

        let record = self.edges.get_mut(&edge).ok_or(MapError::EdgeNotFound(edge))?;
        record.set_endpoint(end, card);
        self.touch();
        tracing::debug!(%edge, %end, %card, "Retargeted edge");
        Ok(())
    }

    fn delete_edge(&mut self, edge: EdgeId) -> MapResult<()> {
        self.remove_edge(edge).ok_or(MapError::EdgeNotFound(edge))?;
        tracing::debug!(%edge, "Deleted edge");
        Ok(())
    }

    fn commit(&mut self) -> MapResult<()> {
        self.touch();
        if let Some(path) = &self.path {
            save_document(self, path)?;
        }
        self.revision += 1;
        tracing::info!(
            revision = self.revision,
            cards = self.card_count(),
            edges = self.edge_count(),
            "Committed document"
        );
        Ok(())
    }
}

impl Validatable for Document {
    fn validate(&self) -> MapResult<()> {
        self.meta.validate()?;

        for (key, card) in &self.cards {
            if *key != card.id {
                return Err(MapError::validation(format!(
                    "Card '{}' is stored under a different id",
                    card.title
                )));
            }
            card.validate()?;
        }

        for (key, edge) in &self.edges {
            if *key != edge.id {
                return Err(MapError::validation(format!(
                    "Edge {} is stored under a different id",
                    edge.id
                )));
            }
            if !self.cards.contains_key(&edge.orig) {
                return Err(MapError::validation(format!(
                    "Edge {} references non-existent origin card {}",
                    edge.id, edge.orig
                )));
            }
            if !self.cards.contains_key(&edge.dest) {
                return Err(MapError::validation(format!(
                    "Edge {} references non-existent destination card {}",
                    edge.id, edge.dest
                )));
            }
        }

        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled Map")
    }
}

// ============================================================================
// DocumentMeta
// ============================================================================

/// Document metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Unique document identifier
    pub id: Uuid,

    /// Document name
    pub name: String,

    /// Document description
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl DocumentMeta {
    /// Create new metadata with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    /// Builder: set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Validatable for DocumentMeta {
    fn validate(&self) -> MapResult<()> {
        if self.name.trim().is_empty() {
            return Err(MapError::validation("Document name cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
