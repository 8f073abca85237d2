//! Entry point of a build: find the root configuration, pick a mode, run it.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info};
use tsdual_toolchain::{find_config_file, parse_config, CancellationToken, CompilerOptions, CONFIG_FILE_NAME};

use crate::error::{BuildError, BuildResult};
use crate::modes::{select_mode, BuildSettings};
use crate::progress::Progress;
use crate::unit::check_config_errors;

/// The root configuration for a run: `explicit` (a file, or a directory
/// holding a `tsconfig.json`) resolved against `cwd`, or the nearest
/// `tsconfig.json` at or above `cwd`.
pub fn locate_config(explicit: Option<&Path>, cwd: &Path) -> BuildResult<PathBuf> {
    let Some(explicit) = explicit else {
        return find_config_file(cwd).ok_or_else(|| BuildError::ConfigNotFound(cwd.to_path_buf()));
    };
    let path = cwd.join(explicit);
    let path = if path.is_dir() { path.join(CONFIG_FILE_NAME) } else { path };
    if path.is_file() {
        Ok(path)
    } else {
        Err(BuildError::ConfigNotFound(path))
    }
}

/// Builds the project at `config_path` and everything it references.
///
/// Configuration errors and missing requirements in any project stop the
/// run before a single file is written.
pub fn compile(config_path: &Path, settings: BuildSettings, progress: &Progress) -> BuildResult<()> {
    let start = Instant::now();
    let root = parse_config(config_path, &CompilerOptions::default())?;
    check_config_errors(&root)?;
    debug!(config = %root.config_path.display(), ?settings, "loaded root configuration");

    let token: Rc<dyn CancellationToken> = progress.token();
    let mut mode = select_mode(root, settings, token)?;
    info!(mode = mode.name(), "selected build mode");

    mode.check_requirements()?;
    mode.build(progress)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "build finished");
    Ok(())
}
