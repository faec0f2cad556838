//! Error types for configuration loading and node creation
//!
//! Model mutations never fail: they are no-ops reporting `false`. Errors are
//! reserved for the outer edges of the crate.

use thiserror::Error;

/// Errors that can occur when loading a diagram configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Errors surfaced by diagram-level operations
#[derive(Error, Debug)]
pub enum DiagramError {
    /// The factory declined to create a node, e.g. a second start node
    #[error("factory '{factory}' refused to create a node")]
    FactoryRefused { factory: String },

    #[error("no node factory registered for '{0}'")]
    UnknownFactory(String),
}
