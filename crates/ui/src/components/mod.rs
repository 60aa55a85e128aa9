//! # Canvas Components
//!
//! The drawable pieces of a CardMap canvas.
//!
//! - **Card**: a draggable card widget with its connector listener registry
//! - **Connection**: the line a connector draws, its style and SVG output
//!
//! ## Draw Order
//!
//! ```text
//! Viewport
//! ├── ViewportCard (bottom to top)
//! └── LinePrimitive (above every card)
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod card;
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use card::ViewportCard;
pub use connection::{LinePrimitive, LineStyle, colors};
