//! Connector state
//!
//! The drag phase and the persistence tag are tracked separately: a connector
//! can be dragging whether or not it already has a model edge, and the
//! combination decides what a release over empty space does.

use cardmap_core::{CardId, EdgeId, End};

// ============================================================================
// Phase
// ============================================================================

/// Interaction phase of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Both ends follow their cards
    #[default]
    Idle,

    /// One end follows the pointer
    Dragging { end: End },

    /// Terminal; the connector no longer draws or listens
    Deleted,
}

impl Phase {
    /// The pointer-controlled end, if any
    pub fn dragging_end(&self) -> Option<End> {
        match self {
            Phase::Dragging { end } => Some(*end),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Dragging { .. } => "dragging",
            Phase::Deleted => "deleted",
        }
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Whether the connector is backed by a model edge yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persistence {
    /// Never dropped on a card; no model edge exists
    #[default]
    Unsettled,

    /// Backed by this model edge
    Settled(EdgeId),
}

impl Persistence {
    pub fn edge(&self) -> Option<EdgeId> {
        match self {
            Persistence::Settled(edge) => Some(*edge),
            Persistence::Unsettled => None,
        }
    }
}

// ============================================================================
// Connector State
// ============================================================================

/// Observable state of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    Settled,
    Dragging,
    Deleted,
}

impl std::fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorState::Settled => write!(f, "settled"),
            ConnectorState::Dragging => write!(f, "dragging"),
            ConnectorState::Deleted => write!(f, "deleted"),
        }
    }
}

impl From<Phase> for ConnectorState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle => ConnectorState::Settled,
            Phase::Dragging { .. } => ConnectorState::Dragging,
            Phase::Deleted => ConnectorState::Deleted,
        }
    }
}

// ============================================================================
// Drop Outcome
// ============================================================================

/// Result of releasing a dragged end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The dragged end now references this card
    Bound(CardId),

    /// Released over empty space; the previous binding was restored
    Reverted,

    /// Released over empty space before ever settling; the connector is gone
    Discarded,

    /// No drag was in progress
    Ignored,
}

impl DropOutcome {
    /// Whether the connector was destroyed by the release
    pub fn is_discarded(&self) -> bool {
        matches!(self, DropOutcome::Discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_phase_dragging_end() {
        assert_eq!(Phase::Idle.dragging_end(), None);
        assert_eq!(Phase::Dragging { end: End::Dest }.dragging_end(), Some(End::Dest));
        assert_eq!(Phase::Deleted.dragging_end(), None);
    }

    #[test]
    fn test_state_from_phase() {
        assert_eq!(ConnectorState::from(Phase::Idle), ConnectorState::Settled);
        assert_eq!(
            ConnectorState::from(Phase::Dragging { end: End::Orig }),
            ConnectorState::Dragging
        );
        assert_eq!(ConnectorState::from(Phase::Deleted).to_string(), "deleted");
    }

    #[test]
    fn test_persistence_edge() {
        let edge = Uuid::new_v4();
        assert_eq!(Persistence::Settled(edge).edge(), Some(edge));
        assert_eq!(Persistence::default().edge(), None);
    }
}
