//! # Connection Line
//!
//! The line primitive a connector draws on the canvas.
//!
//! A connector renders as one straight segment with an arrowhead on its
//! destination end. While one of its ends is being dragged the line switches
//! to the active color. Lines are hit-tested with a tolerance so they can be
//! grabbed with the pointer, and serialize to SVG for export.

use cardmap_core::geometry::distance_to_segment;
use cardmap_core::{ConnectorId, LineId, MapError, MapResult, Position, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default stroke width of a connector line
pub const STROKE_WIDTH: f32 = 6.0;

/// Arrow marker size, relative to the stroke width
pub const ARROW_SIZE: f32 = 3.0;

/// SVG id of the arrowhead marker
pub const ARROW_MARKER_ID: &str = "cardmap-arrow";

/// SVG id of the arrowhead marker used while dragging
pub const ARROW_MARKER_ACTIVE_ID: &str = "cardmap-arrow-active";

// ============================================================================
// Connection Colors
// ============================================================================

/// Colors for different connection states
pub mod colors {
    /// Default connection color
    pub const DEFAULT: &str = "blue";

    /// Connection color while an end is being dragged
    pub const ACTIVE: &str = "#6060ff";
}

// ============================================================================
// Line Style
// ============================================================================

/// Appearance shared by all connector lines on a canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    /// Stroke width in canvas units
    pub width: f32,

    /// Stroke color at rest
    pub color: String,

    /// Stroke color while dragging
    pub active_color: String,

    /// Draw an arrowhead on the destination end
    pub arrow: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: STROKE_WIDTH,
            color: colors::DEFAULT.to_string(),
            active_color: colors::ACTIVE.to_string(),
            arrow: true,
        }
    }
}

impl LineStyle {
    /// Stroke color for the given drag state
    pub fn stroke(&self, active: bool) -> &str {
        if active { &self.active_color } else { &self.color }
    }

    /// SVG `<defs>` with the arrowhead markers, empty when arrows are off
    pub fn svg_defs(&self) -> String {
        if !self.arrow {
            return String::new();
        }

        let marker = |id: &str, color: &str| {
            format!(
                r#"<marker id="{id}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="{size}" markerHeight="{size}" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{color}"/></marker>"#,
                size = ARROW_SIZE,
            )
        };

        format!(
            "<defs>{}{}</defs>",
            marker(ARROW_MARKER_ID, &self.color),
            marker(ARROW_MARKER_ACTIVE_ID, &self.active_color)
        )
    }
}

impl Validatable for LineStyle {
    fn validate(&self) -> MapResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(MapError::invalid_config("line width must be positive"));
        }
        if self.color.trim().is_empty() || self.active_color.trim().is_empty() {
            return Err(MapError::invalid_config("line colors cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Line Primitive
// ============================================================================

/// One drawn connector line
#[derive(Debug, Clone, PartialEq)]
pub struct LinePrimitive {
    /// Handle of this line on its canvas
    pub id: LineId,

    /// Connector that owns the line and receives its pointer events
    pub owner: ConnectorId,

    /// Orig and dest points
    pub coords: [Position; 2],

    /// Whether an end is currently being dragged
    pub active: bool,
}

impl LinePrimitive {
    /// Create a line at rest
    pub fn new(id: LineId, owner: ConnectorId, coords: [Position; 2]) -> Self {
        Self {
            id,
            owner,
            coords,
            active: false,
        }
    }

    /// Distance from a point to the drawn segment
    pub fn distance_to(&self, point: Position) -> f32 {
        distance_to_segment(point, self.coords[0], self.coords[1])
    }

    /// Check whether a point falls on the stroke, widened by `tolerance`
    pub fn hit_test(&self, point: Position, style: &LineStyle, tolerance: f32) -> bool {
        self.distance_to(point) <= style.width / 2.0 + tolerance
    }

    /// Render as an SVG `<line>` element
    pub fn to_svg(&self, style: &LineStyle) -> String {
        let [start, end] = self.coords;
        let marker = if style.arrow {
            let id = if self.active { ARROW_MARKER_ACTIVE_ID } else { ARROW_MARKER_ID };
            format!(r#" marker-end="url(#{id})""#)
        } else {
            String::new()
        };

        format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round"{} data-connector="{}"/>"#,
            start.x,
            start.y,
            end.x,
            end.y,
            style.stroke(self.active),
            style.width,
            marker,
            self.owner
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn horizontal_line() -> LinePrimitive {
        LinePrimitive::new(
            LineId(1),
            Uuid::nil(),
            [Position::new(10.0, 5.0), Position::new(100.0, 5.0)],
        )
    }

    #[test]
    fn test_hit_test_uses_width_and_tolerance() {
        let line = horizontal_line();
        let style = LineStyle::default();
        assert!(line.hit_test(Position::new(50.0, 5.0), &style, 0.0));
        assert!(line.hit_test(Position::new(50.0, 8.0), &style, 0.0));
        assert!(!line.hit_test(Position::new(50.0, 12.0), &style, 0.0));
        assert!(line.hit_test(Position::new(50.0, 12.0), &style, 4.0));
        assert!(!line.hit_test(Position::new(120.0, 5.0), &style, 4.0));
    }

    #[test]
    fn test_stroke_follows_active_flag() {
        let style = LineStyle::default();
        assert_eq!(style.stroke(false), colors::DEFAULT);
        assert_eq!(style.stroke(true), colors::ACTIVE);
    }

    #[test]
    fn test_svg_line() {
        let mut line = horizontal_line();
        let style = LineStyle::default();
        let svg = line.to_svg(&style);
        assert!(svg.starts_with(r#"<line x1="10" y1="5" x2="100" y2="5""#));
        assert!(svg.contains(r#"stroke="blue""#));
        assert!(svg.contains(ARROW_MARKER_ID));

        line.active = true;
        let svg = line.to_svg(&style);
        assert!(svg.contains(r##"stroke="#6060ff""##));
        assert!(svg.contains(ARROW_MARKER_ACTIVE_ID));
    }

    #[test]
    fn test_svg_without_arrow() {
        let style = LineStyle {
            arrow: false,
            ..LineStyle::default()
        };
        assert!(style.svg_defs().is_empty());
        assert!(!horizontal_line().to_svg(&style).contains("marker-end"));
    }

    #[test]
    fn test_style_validation() {
        assert!(LineStyle::default().is_valid());
        let style = LineStyle {
            width: -2.0,
            ..LineStyle::default()
        };
        assert!(!style.is_valid());
    }
}
