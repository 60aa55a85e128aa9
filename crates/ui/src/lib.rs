//! # CardMap UI
//!
//! The interactive canvas of CardMap.
//!
//! This crate puts document cards on a canvas and keeps the connector lines
//! between them in sync while cards move and while the user drags connector
//! ends from card to card.
//!
//! ## Features
//!
//! - Card widgets with geometry and deletion notifications
//! - Connector lines clipped to card boundaries
//! - Endpoint dragging with drop-target highlighting
//! - Deferred model-edge creation for connectors started from a card
//! - SVG rendering of the whole canvas
//!

// ============================================================================
// Modules
// ============================================================================

pub mod components;
pub mod config;
pub mod connector;
pub mod viewport;

// ============================================================================
// Re-exports
// ============================================================================

// Re-export internal crates for convenience
pub use cardmap_core;
pub use cardmap_ir;

pub use components::{LinePrimitive, LineStyle, ViewportCard};
pub use config::{CanvasConfig, ConnectorOptions};
pub use connector::{ConnectorState, DropOutcome, EdgeController, Persistence, Phase};
pub use viewport::{Scene, Viewport};

// ============================================================================
// Constants
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
