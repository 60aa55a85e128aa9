//! Card definitions
//!
//! This module contains the `Card` struct: the persisted side of a draggable
//! box on the canvas.

use cardmap_core::{MapError, MapResult, Position, Rect, Size, Validatable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Card
// ============================================================================

/// A rectangular node of the diagram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier for this card
    pub id: Uuid,

    /// Text shown on the card
    pub title: String,

    /// Bounds on the canvas
    pub rect: Rect,

    /// Z-index for layering on canvas
    #[serde(default)]
    pub z_index: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Card {
    /// Create a new card with the default size at the origin
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            rect: Rect::new(Position::zero(), Size::default_card()),
            z_index: 0,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    /// Builder: set the bounds
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Builder: set the top-left corner
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.rect.position = Position::new(x, y);
        self
    }

    /// Builder: set the z-index
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Replace the bounds
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        self.touch();
    }

    /// Move by a delta
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.rect.position = self.rect.position.offset(dx, dy);
        self.touch();
    }

    /// Check if a point is inside the card
    pub fn contains(&self, point: Position) -> bool {
        self.rect.contains(point)
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Validatable for Card {
    fn validate(&self) -> MapResult<()> {
        if !self.rect.size.is_valid() {
            return Err(MapError::validation(format!(
                "Card '{}' has invalid size {}x{}",
                self.title, self.rect.size.width, self.rect.size.height
            )));
        }
        if !self.rect.position.x.is_finite() || !self.rect.position.y.is_finite() {
            return Err(MapError::validation(format!(
                "Card '{}' has a non-finite position",
                self.title
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_new() {
        let card = Card::new("Idea");
        assert_eq!(card.title, "Idea");
        assert_eq!(card.rect.size, Size::default_card());
        assert_eq!(card.z_index, 0);
        assert!(card.is_valid());
    }

    #[test]
    fn test_card_builders() {
        let card = Card::new("Idea")
            .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
            .at(40.0, 50.0)
            .with_z_index(3);
        assert_eq!(card.rect, Rect::from_xywh(40.0, 50.0, 10.0, 10.0));
        assert_eq!(card.z_index, 3);
    }

    #[test]
    fn test_card_translate() {
        let mut card = Card::new("Idea").at(10.0, 10.0);
        card.translate(5.0, -5.0);
        assert_eq!(card.rect.position, Position::new(15.0, 5.0));
    }

    #[test]
    fn test_card_negative_size_is_invalid() {
        let card = Card::new("Broken").with_rect(Rect::from_xywh(0.0, 0.0, -1.0, 10.0));
        assert!(!card.is_valid());
    }
}
