//! Connector clipping geometry
//!
//! A connector is drawn between the centers of two cards and then clipped so
//! that each end sits on the boundary of its own card. Everything here is a
//! pure function over [`Position`] and [`Rect`].

use crate::types::{ClipPrecision, Position, Rect};

/// Move `p1` along the line toward `p2` until it sits on the boundary of `rect`.
///
/// The wall is chosen by the direction of travel: the right wall when moving
/// right (`run >= 0`), the left wall when moving left, the bottom wall when
/// moving down (`rise >= 0`) and the top wall when moving up. Purely vertical
/// and horizontal lines short-circuit to that wall; for everything else the
/// side wall is tried first and the top/bottom wall is used when the side
/// wall crossing falls outside the rectangle's vertical span.
///
/// `p1` is normally the center of `rect`. When `p1 == p2` the result is the
/// bottom-center point.
pub fn adjust_point(p1: Position, rect: Rect, p2: Position) -> Position {
    adjust_point_with(p1, rect, p2, ClipPrecision::Float)
}

/// [`adjust_point`] with the wall crossing rounded to `precision`.
///
/// The crossing is rounded before it is checked against the rectangle, so
/// with [`ClipPrecision::Pixel`] a crossing just past a corner can still land
/// on the side wall.
pub fn adjust_point_with(
    p1: Position,
    rect: Rect,
    p2: Position,
    precision: ClipPrecision,
) -> Position {
    let rise = p2.y - p1.y;
    let run = p2.x - p1.x;

    let relevant_x = if run < 0.0 { rect.x() } else { rect.right() };
    let relevant_y = if rise < 0.0 { rect.y() } else { rect.bottom() };

    if run == 0.0 {
        return precision.apply(Position::new(p1.x, relevant_y));
    }
    if rise == 0.0 {
        return precision.apply(Position::new(relevant_x, p1.y));
    }

    // y - y1 = m(x - x1), m = rise / run
    let wall_y = precision.round(rise * (relevant_x - p1.x) / run + p1.y);
    if rect.y() <= wall_y && wall_y <= rect.bottom() {
        return precision.apply(Position::new(relevant_x, wall_y));
    }

    let wall_x = precision.round(run * (relevant_y - p1.y) / rise + p1.x);
    precision.apply(Position::new(wall_x, relevant_y))
}

/// Center point of a box
pub fn box_center(rect: Rect) -> Position {
    rect.center()
}

/// Clip the segment between two card centers to both card boundaries.
///
/// The orig center is clipped toward the dest center first, then the dest
/// center is clipped toward the already clipped orig point.
pub fn clip_segment(orig: Rect, dest: Rect, precision: ClipPrecision) -> [Position; 2] {
    let start = adjust_point_with(box_center(orig), orig, box_center(dest), precision);
    let end = adjust_point_with(box_center(dest), dest, start, precision);
    [start, end]
}

/// Shortest distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Position, a: Position, b: Position) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return point.distance_to(&a);
    }

    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let projection = Position::new(a.x + t * dx, a.y + t * dy);
    point.distance_to(&projection)
}

// ============================================================================
// Tests
// ============================================================================
