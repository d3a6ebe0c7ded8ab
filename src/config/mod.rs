//! Configuration module for the flashcard audio generator.
//!
//! Provides CLI argument parsing, the app catalog and the voice table.

pub mod apps;
#[allow(clippy::module_inception)]
mod config;
mod voices;

pub use config::AppConfig;
