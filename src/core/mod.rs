//! Core infrastructure: errors, logging, world configuration

pub mod config;
pub mod error;
pub mod logging;

pub use config::{GenerationMode, WorldConfig};
pub use error::{Error, Result};
