//! Core starfield simulation library.
//!
//! Main components:
//! - [`quadtree`]: point quadtree for neighbour queries.
//! - [`dot`]: background dots and pulsars.
//! - [`star`]: shooting stars and their emitter.
//! - [`nebula`]: drifting ambient blobs.
//! - [`phases`]: per-frame simulation phases.
//! - [`render`] / [`canvas`]: drawing onto a host-provided surface.
//! - [`sim`]: the owned simulation state and per-frame loop.
//! - [`config`] / [`error`]: tuning constants and their validation.
//! - [`types`]: shared type aliases and geometry.

pub mod canvas;
pub mod config;
pub mod dot;
pub mod error;
pub mod nebula;
pub mod phases;
pub mod quadtree;
pub mod render;
pub mod sim;
pub mod star;
pub mod types;

pub use config::Config;
pub use sim::Constellation;
pub use types::Viewport;
