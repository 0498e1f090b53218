//! End-to-end pipeline
//!
//! - config: tunables and presets
//! - observer: diagnostic side channel
//! - runner: the `DriftPipeline` facade

pub mod config;
pub mod observer;
pub mod runner;

pub use config::*;
pub use observer::*;
pub use runner::*;
