//! # CardMap Core
//!
//! Core types, geometry, traits, and error handling for CardMap.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: identifiers and geometric primitives (Position, Size, Rect)
//! - **Geometry**: connector clipping against card boundaries
//! - **Traits**: the card, surface, and document contracts connectors rely on
//! - **Errors**: unified error handling with `MapError` and `MapResult`
//!

pub mod error;
pub mod geometry;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{MapError, MapResult};
pub use geometry::{adjust_point, adjust_point_with, box_center, clip_segment};
pub use traits::{CardWidget, DocumentHandle, Surface, Validatable};
pub use types::{
    CardEvent, CardId, ClipPrecision, ConnectorId, EdgeId, End, LineId, Position, Rect, Size,
    SubscriptionToken,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
