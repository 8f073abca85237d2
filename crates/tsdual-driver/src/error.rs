//! Error types for the build driver

use std::path::PathBuf;

use thiserror::Error;
use tsdual_toolchain::{ConfigError, ToolchainError};

#[derive(Debug, Error)]
pub enum BuildError {
    /// No `tsconfig.json` was given or found above the working directory
    #[error("Cannot find a tsconfig.json file starting from '{}'", .0.display())]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configuration parsed but reported errors
    #[error("{formatted}")]
    ConfigDiagnostics { formatted: String },

    #[error(
        "This tool depends on the isolatedModules option. Please enable it in your {config_file} file in your project named {project}."
    )]
    MissingIsolatedModules { config_file: String, project: String },

    /// Pre-emit or emit diagnostics, already formatted
    #[error("{formatted}\n{prefix}. Exiting.")]
    Diagnostics { prefix: String, formatted: String },

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Circular project reference detected: {}", .0.join(" -> "))]
    CircularReference(Vec<String>),

    #[error("Project order empty, please make sure your project references are set up properly")]
    EmptyProjectOrder,

    #[error("Circular build order currently not supported")]
    CircularBuildOrder,

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("Could not {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not serialize '{}': {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn diagnostics(prefix: impl Into<String>, formatted: impl Into<String>) -> Self {
        Self::Diagnostics {
            prefix: prefix.into(),
            formatted: formatted.into().trim_end().to_string(),
        }
    }

    /// The process exit status this failure ends the run with.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::ConfigNotFound(_) => 2,
            _ => 1,
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
