//! EPC Map Core - Domain models, configuration, and port definitions
//!
//! This crate contains the building/EPC domain model and the traits through which
//! the colouring engine talks to the map renderer, the data-fetch layer and
//! preference storage.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{EpcMapError, Result};
