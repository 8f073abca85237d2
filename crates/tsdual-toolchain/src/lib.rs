//! # tsdual toolchain
//!
//! The compiler services a dual-format build is driven through:
//!
//! - [`parse_config`]: reads `tsconfig.json` files, following `extends`
//!   and expanding `include` patterns
//! - [`Program`]: parses a set of files, reports pre-emit diagnostics and
//!   emits JavaScript through optional [`CustomTransformers`]
//! - [`SolutionBuilder`]: orders a tree of project references and tracks
//!   which projects are stale through `.tsbuildinfo` files
//! - [`emit_hook`]: the process-wide choice of output file extension

pub mod buildinfo;
pub mod config;
pub mod diagnostics;
pub mod emit_hook;
pub mod error;
pub mod host;
pub mod options;
pub mod program;
pub mod resolver;
pub mod solution;
pub mod transform;

pub use config::{find_config_file, parse_config, ParsedConfig, ProjectReference, CONFIG_FILE_NAME};
pub use diagnostics::{format_diagnostics, stderr_is_pretty, Diagnostic, DiagnosticCategory, SourceText};
pub use error::{ConfigError, ConfigResult, Result, ToolchainError};
pub use host::{CompilerHost, SystemHost};
pub use options::{normalize, CompilerOptions};
pub use program::{CreateProgramOptions, EmitResult, Program, SourceFile};
pub use resolver::{is_relative_specifier, resolve_module_name, ResolvedModule};
pub use solution::{BuildOptions, InvalidatedProject, SolutionBuilder, UpToDateStatus};
pub use transform::{CancellationToken, CustomTransformers, NeverCancelled, TransformContext, Transformer};
pub use tsdual_emit::{ModuleKind, ScriptTarget};
