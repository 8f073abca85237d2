//! Error types for the toolchain

use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or interpreting a `tsconfig.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot find a tsconfig.json file at the specified directory: '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse file '{}': {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("File '{specifier}' not found (extended by '{}')", from.display())]
    ExtendsNotFound { specifier: String, from: PathBuf },

    #[error("Circularity detected while resolving configuration: {}", .0.display())]
    CircularExtends(PathBuf),
}

impl ConfigError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors from programs and the solution builder.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not write file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not remove '{}': {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid build info file '{}': {source}", path.display())]
    BuildInfo {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Circular project reference: {}", .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    CircularReference(Vec<PathBuf>),
}

pub type Result<T> = std::result::Result<T, ToolchainError>;
