//! Edge definitions
//!
//! This module contains the `Edge` struct: the persisted directed link
//! between two cards.

use cardmap_core::{CardId, End};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Edge
// ============================================================================

/// A directed connection from one card to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: Uuid,

    /// Card the edge starts at
    pub orig: CardId,

    /// Card the edge points to
    pub dest: CardId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge between two cards
    pub fn new(orig: CardId, dest: CardId) -> Self {
        Self {
            id: Uuid::new_v4(),
            orig,
            dest,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    /// Card at one end
    pub fn endpoint(&self, end: End) -> CardId {
        match end {
            End::Orig => self.orig,
            End::Dest => self.dest,
        }
    }

    /// Point one end at another card
    pub fn set_endpoint(&mut self, end: End, card: CardId) {
        match end {
            End::Orig => self.orig = card,
            End::Dest => self.dest = card,
        }
        self.touch();
    }

    /// Check whether either end references the card
    pub fn involves(&self, card: CardId) -> bool {
        self.orig == card || self.dest == card
    }

    /// Both ends reference the same card
    pub fn is_self_loop(&self) -> bool {
        self.orig == self.dest
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

// ============================================================================
// Tests
// ============================================================================
