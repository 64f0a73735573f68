//! Error types for Skirmish.

use thiserror::Error;

/// Top-level error type for Skirmish operations.
#[derive(Debug, Error)]
pub enum SkirmishError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading tuning and scenario files.
///
/// Semantic problems in an otherwise well-formed configuration are not
/// errors; they are reported as non-fatal defects by the gameplay crate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is not valid TOML or does not match the schema
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for Skirmish operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;
