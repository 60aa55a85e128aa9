//! Core traits for CardMap
//!
//! This module defines the contracts the connector controller depends on:
//! the card widget it attaches to, the drawing surface it renders on, and
//! the document handle it persists edges through. It also holds the
//! `Validatable` trait used by the document model.

use crate::error::MapResult;
use crate::types::{
    CardEvent, CardId, ConnectorId, EdgeId, End, LineId, Position, Rect, SubscriptionToken,
};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use cardmap_core::{MapError, MapResult, Validatable};
///
/// struct Card {
///     width: f32,
/// }
///
/// impl Validatable for Card {
///     fn validate(&self) -> MapResult<()> {
///         if self.width < 0.0 {
///             return Err(MapError::validation("Width must not be negative"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `MapError` describing the problem.
    fn validate(&self) -> MapResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// CardWidget Trait
// ============================================================================

/// A draggable card as seen by the connectors attached to it
///
/// Cards keep a registry of listeners for two kinds of notification
/// ([`CardEvent::GeometryChanged`] and [`CardEvent::Deleted`]). A listener is
/// identified by the connector that registered it; the returned
/// [`SubscriptionToken`] is only used to remove the registration again.
pub trait CardWidget {
    /// Identity of the card, shared with the document card it displays
    fn card_id(&self) -> CardId;

    /// Current on-screen bounds
    fn rect(&self) -> Rect;

    /// Show drop-target feedback
    fn highlight(&mut self);

    /// Remove drop-target feedback
    fn unhighlight(&mut self);

    fn is_highlighted(&self) -> bool;

    /// Register `listener` for `event` notifications
    fn add_listener(&mut self, event: CardEvent, listener: ConnectorId) -> SubscriptionToken;

    /// Remove a registration. Returns `false` if the token was unknown.
    fn remove_listener(&mut self, token: SubscriptionToken) -> bool;
}

// ============================================================================
// Surface Trait
// ============================================================================

/// The canvas a connector draws on and hit-tests against
pub trait Surface {
    type Card: CardWidget;

    /// Look up a card by identity
    fn card(&self, id: CardId) -> Option<&Self::Card>;

    fn card_mut(&mut self, id: CardId) -> Option<&mut Self::Card>;

    /// Topmost card whose bounds contain `point`
    fn find_card_at(&self, point: Position) -> Option<CardId>;

    /// Create the line primitive for a connector
    fn create_line(&mut self, owner: ConnectorId, coords: [Position; 2]) -> LineId;

    /// Move a line's endpoints and set whether it is being dragged
    fn update_line(&mut self, line: LineId, coords: [Position; 2], active: bool);

    fn remove_line(&mut self, line: LineId);
}

// ============================================================================
// DocumentHandle Trait
// ============================================================================

/// The persisted model connectors commit their edges to
pub trait DocumentHandle {
    /// Create a persisted edge between two cards
    fn create_edge(&mut self, orig: CardId, dest: CardId) -> MapResult<EdgeId>;

    /// Point one end of an existing edge at another card
    fn set_edge_endpoint(&mut self, edge: EdgeId, end: End, card: CardId) -> MapResult<()>;

    /// Remove a persisted edge
    fn delete_edge(&mut self, edge: EdgeId) -> MapResult<()>;

    /// Persist the current state
    fn commit(&mut self) -> MapResult<()>;
}
