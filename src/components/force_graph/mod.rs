//! Force-directed graph visualization component.
//!
//! Renders the graph model on an HTML canvas with:
//! - Physics-based node positioning via force simulation
//! - Pan, zoom, and node dragging interactions
//! - Curved parallel links and self-loops
//! - Path highlighting with dimming of everything off the path
//!
//! The canvas reads the model through a [`ViewFeed`](crate::workspace::ViewFeed)
//! and applies the queued view updates once per animation frame.

mod component;
mod render;
pub mod scale;
mod state;

pub use component::ForceGraphCanvas;
pub use scale::ScaleConfig;
