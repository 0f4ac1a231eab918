//! EPC Map Render - Building colouring and map state
//!
//! This crate turns the visible building set into paint expressions for the
//! single- and multi-dwelling layers, owns the map session lifecycle, runs
//! the selection state machine, and ties them together in [`MapViewer`].
//! A headless engine is included for tests and offline compilation.

pub mod compiler;
pub mod headless;
pub mod layers;
pub mod orchestrator;
pub mod palette;
pub mod pattern;
pub mod session;
pub mod ui;
pub mod viewer;

pub use compiler::{compile, CompiledPaint, LayerPaint, PaintCompiler};
pub use headless::HeadlessMapEngine;
pub use orchestrator::{Effect, Selection, SelectionEvent, SelectionOrchestrator};
pub use palette::{mean_rating, ColourTable, DisplayMode, Palette};
pub use pattern::{pattern_images, stripe_pattern};
pub use session::{LifecycleSignal, MapSession};
pub use ui::UiState;
pub use viewer::{MapViewer, COLOUR_BLIND_PREFERENCE};
