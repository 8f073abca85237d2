//! How a root configuration is turned into builds.
//!
//! - [`SimpleMode`]: one project, no references
//! - [`MultiSimpleMode`]: a root that references projects, built one after
//!   another in dependency order, each through both formats
//! - [`CompositeMode`]: incremental project references, where up-to-date
//!   projects are skipped

mod companion;
mod composite;
mod multi;
mod simple;

use std::rc::Rc;

use tsdual_toolchain::{CancellationToken, CompilerOptions, ParsedConfig};

use crate::error::BuildResult;
use crate::progress::Progress;
use crate::unit::BuildUnit;

pub use companion::{write_companion_configs, CompanionConfigs, CACHE_DIR};
pub use composite::CompositeMode;
pub use multi::MultiSimpleMode;
pub use simple::SimpleMode;

/// What a run was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSettings {
    /// Run the CommonJS transformers so `require()` returns the default export
    pub use_cjs_transformers: bool,
    /// Remove previous outputs first
    pub clean: bool,
    /// Build project references incrementally even when the root does not ask for it
    pub incremental: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            use_cjs_transformers: true,
            clean: false,
            incremental: false,
        }
    }
}

pub trait ProjectMode {
    fn name(&self) -> &'static str;

    /// Checks every project before anything is written.
    fn check_requirements(&self) -> BuildResult<()>;

    fn build(&mut self, progress: &Progress) -> BuildResult<()>;
}

/// Picks the mode for `root`.
pub fn select_mode(
    root: ParsedConfig,
    settings: BuildSettings,
    token: Rc<dyn CancellationToken>,
) -> BuildResult<Box<dyn ProjectMode>> {
    if root.project_references.is_empty() {
        return Ok(Box::new(SimpleMode::new(root, settings, token)));
    }
    let incremental = settings.incremental
        || root.options.composite.unwrap_or(false)
        || root.options.incremental.unwrap_or(false);
    if incremental {
        Ok(Box::new(CompositeMode::new(root, settings, token)?))
    } else {
        Ok(Box::new(MultiSimpleMode::new(root, settings, token)?))
    }
}

pub(crate) const CREATE_CJS: &str = "Creating CommonJS compiler instance";
pub(crate) const CHECK: &str = "Checking for syntax and type errors";
pub(crate) const EMIT_CJS: &str = "Emitting CommonJS modules";
pub(crate) const CREATE_ESM: &str = "Creating ESM compiler instance";
pub(crate) const EMIT_ESM: &str = "Emitting ES Modules";

/// Creates, checks and emits the CommonJS side of `unit`.
pub(crate) fn build_cjs(
    unit: &mut BuildUnit,
    settings: BuildSettings,
    progress: &Progress,
    label: Option<&str>,
) -> BuildResult<()> {
    let overrides = CompilerOptions::default();
    progress.step_in(CREATE_CJS, label, || unit.clean_and_init_cjs(&overrides))?;
    progress.step_in(CHECK, label, || unit.check_diagnostics())?;
    progress.step_in(EMIT_CJS, label, || unit.emit_cjs(settings.use_cjs_transformers))
}

/// Runs both formats of `unit` and releases its programs.
pub(crate) fn build_unit(
    unit: &mut BuildUnit,
    settings: BuildSettings,
    progress: &Progress,
    label: Option<&str>,
) -> BuildResult<()> {
    build_cjs(unit, settings, progress, label)?;
    let overrides = CompilerOptions::default();
    progress.step_in(CREATE_ESM, label, || unit.clean_and_init_esm(&overrides))?;
    progress.step_in(EMIT_ESM, label, || unit.emit_esm())?;
    unit.dispose();
    Ok(())
}
