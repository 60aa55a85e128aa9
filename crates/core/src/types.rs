//! Core types used throughout CardMap
//!
//! This module contains the identifiers, geometric primitives, and small
//! enums shared by the document model, the canvas, and the connector
//! controller.

use serde::{Deserialize, Serialize};

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Identifier of a card, shared by the document card and its canvas widget
pub type CardId = uuid::Uuid;

/// Identifier of a persisted edge in the document
pub type EdgeId = uuid::Uuid;

/// Identifier of a connector controller living on a canvas
pub type ConnectorId = uuid::Uuid;

/// Handle to a line primitive drawn on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u64);

/// Opaque token returned when a listener is registered on a card.
///
/// Only meaningful to the card that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub u64);

// ============================================================================
// Geometry Types
// ============================================================================

/// Position on the 2D canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Calculate the Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Add an offset to this position
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Drop the fractional part of both coordinates (toward zero)
    pub fn trunc(&self) -> Self {
        Self {
            x: self.x.trunc(),
            y: self.y.trunc(),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Size of a card on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Create a zero size
    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Default size for newly created cards
    pub fn default_card() -> Self {
        Self {
            width: 160.0,
            height: 90.0,
        }
    }

    /// Whether both dimensions are non-negative and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::default_card()
    }
}

/// Axis-aligned bounding rectangle of a card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(position: Position, size: Size) -> Self {
        Self { position, size }
    }

    /// Create a rectangle from coordinates and dimensions
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Left edge
    pub fn x(&self) -> f32 {
        self.position.x
    }

    /// Top edge
    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Right edge (`x + width`)
    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    /// Bottom edge (`y + height`)
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// Check if a point is contained within this rectangle (edges inclusive)
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x() && point.x <= self.right() && point.y >= self.y() && point.y <= self.bottom()
    }

    /// Check whether a point lies on one of the four sides
    pub fn on_boundary(&self, point: Position, tolerance: f32) -> bool {
        let within_x = point.x >= self.x() - tolerance && point.x <= self.right() + tolerance;
        let within_y = point.y >= self.y() - tolerance && point.y <= self.bottom() + tolerance;
        let on_vertical = (point.x - self.x()).abs() <= tolerance
            || (point.x - self.right()).abs() <= tolerance;
        let on_horizontal = (point.y - self.y()).abs() <= tolerance
            || (point.y - self.bottom()).abs() <= tolerance;
        (on_vertical && within_y) || (on_horizontal && within_x)
    }

    /// Get the center point of the rectangle
    pub fn center(&self) -> Position {
        Position {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }

    /// Same size, moved to a new top-left corner
    pub fn moved_to(&self, position: Position) -> Self {
        Self {
            position,
            size: self.size,
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            position: Position::zero(),
            size: Size::default(),
        }
    }
}

// ============================================================================
// Connector Types
// ============================================================================

/// One end of a directed connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum End {
    /// The source end (index 0)
    Orig,
    /// The target end (index 1)
    Dest,
}

impl End {
    /// Index into a `[T; 2]` pair of per-end values
    pub fn index(self) -> usize {
        match self {
            End::Orig => 0,
            End::Dest => 1,
        }
    }

    /// The opposite end
    pub fn other(self) -> Self {
        match self {
            End::Orig => End::Dest,
            End::Dest => End::Orig,
        }
    }

    /// Both ends, orig first
    pub fn both() -> [End; 2] {
        [End::Orig, End::Dest]
    }
}

impl std::fmt::Display for End {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            End::Orig => write!(f, "orig"),
            End::Dest => write!(f, "dest"),
        }
    }
}

/// Kinds of notification a card delivers to its listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardEvent {
    /// The card's bounding box changed
    GeometryChanged,
    /// The card is being removed from the canvas
    Deleted,
}

/// How clipped endpoints are rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipPrecision {
    /// Truncate toward zero, giving whole-pixel endpoints
    #[default]
    Pixel,
    /// Keep full floating-point precision
    Float,
}

impl ClipPrecision {
    /// Apply this precision to a computed point
    pub fn apply(self, point: Position) -> Position {
        match self {
            ClipPrecision::Pixel => point.trunc(),
            ClipPrecision::Float => point,
        }
    }

    /// Apply this precision to a single coordinate
    pub fn round(self, value: f32) -> f32 {
        match self {
            ClipPrecision::Pixel => value.trunc(),
            ClipPrecision::Float => value,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_position_trunc() {
        assert_eq!(Position::new(10.9, -2.5).trunc(), Position::new(10.0, -2.0));
    }

    #[test]
    fn test_position_add_sub() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(3.0, 5.0);
        assert_eq!(a + b, Position::new(4.0, 7.0));
        assert_eq!(b - a, Position::new(2.0, 3.0));
    }

    #[test]
    fn test_size_validity() {
        assert!(Size::new(0.0, 0.0).is_valid());
        assert!(!Size::new(-1.0, 5.0).is_valid());
        assert!(!Size::new(f32::NAN, 5.0).is_valid());
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::from_xywh(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains(Position::new(10.0, 10.0)));
        assert!(rect.contains(Position::new(110.0, 60.0)));
        assert!(!rect.contains(Position::new(110.1, 30.0)));
        assert!(!rect.contains(Position::new(5.0, 30.0)));
    }

    #[test]
    fn test_rect_center() {
        let rect = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rect.center(), Position::new(5.0, 5.0));
    }

    #[test]
    fn test_rect_on_boundary() {
        let rect = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(rect.on_boundary(Position::new(10.0, 5.0), 0.0));
        assert!(rect.on_boundary(Position::new(3.0, 0.0), 0.0));
        assert!(!rect.on_boundary(Position::new(5.0, 5.0), 0.0));
        assert!(!rect.on_boundary(Position::new(20.0, 0.0), 0.0));
    }

    #[test]
    fn test_end_index_and_other() {
        assert_eq!(End::Orig.index(), 0);
        assert_eq!(End::Dest.index(), 1);
        assert_eq!(End::Orig.other(), End::Dest);
        assert_eq!(End::Dest.other(), End::Orig);
        assert_eq!(End::Dest.to_string(), "dest");
    }

    #[test]
    fn test_clip_precision_apply() {
        let p = Position::new(12.75, 7.5);
        assert_eq!(ClipPrecision::Pixel.apply(p), Position::new(12.0, 7.0));
        assert_eq!(ClipPrecision::Float.apply(p), p);
    }
}
