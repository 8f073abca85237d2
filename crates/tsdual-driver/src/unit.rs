//! One project compiled twice: CommonJS first, then ES modules.

use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, info};
use tsdual_toolchain::{
    format_diagnostics, stderr_is_pretty, CancellationToken, CompilerHost, CompilerOptions, CreateProgramOptions,
    CustomTransformers, Diagnostic, ModuleKind, ParsedConfig, Program, SystemHost,
};

use crate::error::{BuildError, BuildResult};
use crate::mjs_guard::MjsExtensionGuard;

/// Where a unit is in its build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Uninitialized,
    CjsInitialized,
    CjsChecked,
    CjsEmitted,
    EsmInitialized,
    EsmEmitted,
    Disposed,
}

/// A program; it owns the host it reads and writes through.
struct CompilationContext {
    program: Program,
}

impl CompilationContext {
    fn create(config: &ParsedConfig, options: CompilerOptions) -> Self {
        CompilationContext {
            program: create_program(config, options),
        }
    }
}

/// A program over `config`'s files with `options`, on a fresh system host.
pub(crate) fn create_program(config: &ParsedConfig, options: CompilerOptions) -> Program {
    let host: Arc<dyn CompilerHost> = Arc::new(SystemHost::new());
    let program = Program::create(CreateProgramOptions {
        options,
        root_names: config.file_names.clone(),
        host: Arc::clone(&host),
        project_references: config.project_references.clone(),
    });
    debug!(
        config = %config.config_path.display(),
        cwd = %host.current_directory().display(),
        files = program.source_files().len(),
        "created program"
    );
    program
}

pub struct BuildUnit {
    config: ParsedConfig,
    clean: bool,
    token: Rc<dyn CancellationToken>,
    state: UnitState,
    cjs: Option<CompilationContext>,
    esm: Option<CompilationContext>,
}

impl BuildUnit {
    /// With `clean`, each format's output directory is deleted before its
    /// program is created.
    pub fn new(config: ParsedConfig, clean: bool, token: Rc<dyn CancellationToken>) -> Self {
        BuildUnit {
            config,
            clean,
            token,
            state: UnitState::Uninitialized,
            cjs: None,
            esm: None,
        }
    }

    pub fn config(&self) -> &ParsedConfig {
        &self.config
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    /// The project's name: its directory's base name.
    pub fn name(&self) -> String {
        self.config.name()
    }

    pub fn check_requirements(&self) -> BuildResult<()> {
        check_requirements(&self.config)
    }

    pub fn clean_and_init_cjs(&mut self, options: &CompilerOptions) -> BuildResult<()> {
        if self.cjs.is_some() {
            return Err(BuildError::InvalidState("CJS host/program already initialized"));
        }
        if self.clean {
            if let Some(out_dir) = &self.config.options.out_dir {
                remove_dir(&self.config.config_dir().join(out_dir))?;
            }
        }
        let options = self.config.options.merged(options).merged(&commonjs_overrides());
        self.cjs = Some(CompilationContext::create(&self.config, options));
        self.state = UnitState::CjsInitialized;
        Ok(())
    }

    pub fn check_diagnostics(&mut self) -> BuildResult<()> {
        let context = self
            .cjs
            .as_ref()
            .ok_or(BuildError::InvalidState("CJS host/program not initialized"))?;
        if self.state != UnitState::CjsInitialized {
            return Err(BuildError::InvalidState("CJS diagnostics already checked"));
        }
        let diagnostics = context.program.pre_emit_diagnostics(self.token.as_ref());
        fail_on(&diagnostics, "Found syntax or type errors")?;
        self.state = UnitState::CjsChecked;
        Ok(())
    }

    pub fn emit_cjs(&mut self, use_transformers: bool) -> BuildResult<()> {
        let context = self
            .cjs
            .as_ref()
            .ok_or(BuildError::InvalidState("CJS host/program not initialized"))?;
        if self.state != UnitState::CjsChecked {
            return Err(BuildError::InvalidState("CJS diagnostics not checked"));
        }
        let transformers = use_transformers.then(tsdual_transform::commonjs_transformers);
        emit(&context.program, transformers.as_ref(), self.token.as_ref(), "Error emitting CommonJS")?;
        self.state = UnitState::CjsEmitted;
        Ok(())
    }

    pub fn clean_and_init_esm(&mut self, options: &CompilerOptions) -> BuildResult<()> {
        if self.esm.is_some() {
            return Err(BuildError::InvalidState("ESM host/program already initialized"));
        }
        if self.state != UnitState::CjsEmitted {
            return Err(BuildError::InvalidState("CommonJS modules not emitted"));
        }
        let out_dir = self.config.config_dir().join("es");
        if self.clean {
            remove_dir(&out_dir)?;
        }
        let options = self.config.options.merged(options).merged(&esm_overrides(out_dir));
        self.esm = Some(CompilationContext::create(&self.config, options));
        self.state = UnitState::EsmInitialized;
        Ok(())
    }

    pub fn emit_esm(&mut self) -> BuildResult<()> {
        let context = self
            .esm
            .as_ref()
            .ok_or(BuildError::InvalidState("ESM host/program not initialized"))?;
        if self.state != UnitState::EsmInitialized {
            return Err(BuildError::InvalidState("ES modules already emitted"));
        }
        let _guard = MjsExtensionGuard::install();
        let transformers = tsdual_transform::esm_transformers();
        emit(&context.program, Some(&transformers), self.token.as_ref(), "Error emitting ES modules")?;
        self.state = UnitState::EsmEmitted;
        Ok(())
    }

    /// Drops both programs. The unit can be built again afterwards.
    pub fn dispose(&mut self) {
        self.cjs = None;
        self.esm = None;
        self.state = UnitState::Disposed;
    }
}

/// Fails unless `config` enables `isolatedModules`, which every transform
/// relies on to see one file at a time.
pub fn check_requirements(config: &ParsedConfig) -> BuildResult<()> {
    if config.options.isolated_modules.unwrap_or(false) {
        return Ok(());
    }
    Err(BuildError::MissingIsolatedModules {
        config_file: config
            .config_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        project: config.name(),
    })
}

/// Fails with the configuration's own errors, if it reported any.
pub fn check_config_errors(config: &ParsedConfig) -> BuildResult<()> {
    if config.errors.is_empty() {
        return Ok(());
    }
    Err(BuildError::ConfigDiagnostics {
        formatted: format_diagnostics(&config.errors, stderr_is_pretty()).trim_end().to_string(),
    })
}

/// Options every CommonJS program is created with. Left to itself, `module`
/// follows the target and would pick ES modules from ES2015 on.
pub fn commonjs_overrides() -> CompilerOptions {
    CompilerOptions {
        module: Some(ModuleKind::CommonJs),
        ..CompilerOptions::default()
    }
}

/// Options every ES module program is created with.
pub fn esm_overrides(out_dir: impl Into<std::path::PathBuf>) -> CompilerOptions {
    CompilerOptions {
        out_dir: Some(out_dir.into()),
        module: Some(ModuleKind::EsNext),
        declaration: Some(false),
        no_resolve: Some(true),
        no_lib: Some(true),
        ..CompilerOptions::default()
    }
}

/// Emits `program` and turns any diagnostics into an error with `prefix`.
pub(crate) fn emit(
    program: &Program,
    transformers: Option<&CustomTransformers>,
    token: &dyn CancellationToken,
    prefix: &str,
) -> BuildResult<()> {
    let result = program.emit(transformers, token);
    fail_on(&result.diagnostics, prefix)?;
    for file in &result.emitted_files {
        debug!(file = %file.display(), "emitted");
    }
    Ok(())
}

fn fail_on(diagnostics: &[Diagnostic], prefix: &str) -> BuildResult<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    Err(BuildError::diagnostics(
        prefix,
        format_diagnostics(diagnostics, stderr_is_pretty()),
    ))
}

fn remove_dir(path: &Path) -> BuildResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            info!(path = %path.display(), "removed output directory");
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::io("remove", path, source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hook_lock, Project};
    use pretty_assertions::assert_eq;
    use tsdual_toolchain::{parse_config, NeverCancelled};

    fn unit(project: &Project, clean: bool) -> BuildUnit {
        let config = parse_config(&project.path("tsconfig.json"), &CompilerOptions::default()).unwrap();
        BuildUnit::new(config, clean, Rc::new(NeverCancelled))
    }

    fn build(unit: &mut BuildUnit) -> BuildResult<()> {
        unit.check_requirements()?;
        unit.clean_and_init_cjs(&CompilerOptions::default())?;
        unit.check_diagnostics()?;
        unit.emit_cjs(true)?;
        unit.clean_and_init_esm(&CompilerOptions::default())?;
        unit.emit_esm()
    }

    #[test]
    fn test_full_lifecycle_writes_both_formats() {
        let _lock = hook_lock();
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib", "target": "es2020" } }"#),
            ("src/index.ts", "import { two } from './two';\nexport default two + 40;\n"),
            ("src/two.ts", "export const two = 2;\n"),
        ]);
        let mut unit = unit(&project, false);
        build(&mut unit).unwrap();
        assert_eq!(unit.state(), UnitState::EsmEmitted);

        let cjs = project.read("lib/index.js");
        assert!(cjs.contains("module.exports = exports = __defaultExport;"), "{}", cjs);
        assert!(project.read("lib/two.js").contains("exports.two = 2;"));

        let esm = project.read("es/index.mjs");
        assert!(esm.contains("import { two } from \"./two.mjs\";"), "{}", esm);
        assert!(project.exists("es/two.mjs"));
        assert!(!project.exists("es/two.js"));
    }

    #[test]
    fn test_missing_isolated_modules_names_the_project() {
        let project = Project::new(&[("tsconfig.json", "{}"), ("a.ts", "export {};\n")]);
        let error = unit(&project, false).check_requirements().unwrap_err();
        let message = error.to_string();
        assert!(message.contains("in your tsconfig.json file in your project named "), "{}", message);
        assert!(message.ends_with(&format!("named {}.", project.name())), "{}", message);
    }

    #[test]
    fn test_out_of_order_calls_are_invalid_state() {
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib" } }"#),
            ("a.ts", "export const a = 1;\n"),
        ]);
        let mut unit = unit(&project, false);
        let message = |result: BuildResult<()>| result.unwrap_err().to_string();

        assert_eq!(message(unit.check_diagnostics()), "invalid state: CJS host/program not initialized");
        assert_eq!(message(unit.emit_cjs(true)), "invalid state: CJS host/program not initialized");
        assert_eq!(message(unit.emit_esm()), "invalid state: ESM host/program not initialized");

        unit.clean_and_init_cjs(&CompilerOptions::default()).unwrap();
        assert_eq!(
            message(unit.clean_and_init_cjs(&CompilerOptions::default())),
            "invalid state: CJS host/program already initialized"
        );
        assert_eq!(message(unit.emit_cjs(true)), "invalid state: CJS diagnostics not checked");
        assert_eq!(
            message(unit.clean_and_init_esm(&CompilerOptions::default())),
            "invalid state: CommonJS modules not emitted"
        );
    }

    #[test]
    fn test_completed_unit_rejects_repeated_steps() {
        let _lock = hook_lock();
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib" } }"#),
            ("a.ts", "export const a = 1;\n"),
        ]);
        let mut unit = unit(&project, false);
        let message = |result: BuildResult<()>| result.unwrap_err().to_string();

        unit.clean_and_init_cjs(&CompilerOptions::default()).unwrap();
        unit.check_diagnostics().unwrap();
        assert_eq!(message(unit.check_diagnostics()), "invalid state: CJS diagnostics already checked");
        unit.emit_cjs(true).unwrap();
        assert_eq!(message(unit.emit_cjs(true)), "invalid state: CJS diagnostics not checked");
        unit.clean_and_init_esm(&CompilerOptions::default()).unwrap();
        unit.emit_esm().unwrap();
        assert_eq!(unit.state(), UnitState::EsmEmitted);

        assert_eq!(message(unit.emit_esm()), "invalid state: ES modules already emitted");
        assert_eq!(message(unit.check_diagnostics()), "invalid state: CJS diagnostics already checked");
        assert_eq!(message(unit.emit_cjs(true)), "invalid state: CJS diagnostics not checked");
        assert_eq!(unit.state(), UnitState::EsmEmitted);
    }

    #[test]
    fn test_commonjs_output_ignores_the_configured_module() {
        let _lock = hook_lock();
        let project = Project::new(&[
            (
                "tsconfig.json",
                r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib", "target": "es2022", "module": "esnext" } }"#,
            ),
            ("src/index.ts", "export const answer = 42;\nexport default answer;\n"),
        ]);
        build(&mut unit(&project, false)).unwrap();

        let cjs = project.read("lib/index.js");
        assert!(cjs.contains("exports.answer = 42;"), "{}", cjs);
        assert!(cjs.contains("module.exports = exports = answer;"), "{}", cjs);
        assert!(!cjs.contains("export const"), "{}", cjs);
        let esm = project.read("es/index.mjs");
        assert!(esm.contains("export const answer = 42;"), "{}", esm);
    }

    #[test]
    fn test_dispose_allows_reinitialization() {
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true } }"#),
            ("a.ts", "export const a = 1;\n"),
        ]);
        let mut unit = unit(&project, false);
        unit.clean_and_init_cjs(&CompilerOptions::default()).unwrap();
        unit.dispose();
        assert_eq!(unit.state(), UnitState::Disposed);
        unit.clean_and_init_cjs(&CompilerOptions::default()).unwrap();
        assert_eq!(unit.state(), UnitState::CjsInitialized);
    }

    #[test]
    fn test_diagnostics_stop_the_build() {
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib" } }"#),
            ("a.ts", "import { b } from './missing';\nexport const a = b;\n"),
        ]);
        let mut unit = unit(&project, false);
        unit.clean_and_init_cjs(&CompilerOptions::default()).unwrap();
        let message = unit.check_diagnostics().unwrap_err().to_string();
        assert!(message.contains("TS2307"), "{}", message);
        assert!(message.ends_with("Found syntax or type errors. Exiting."), "{}", message);
        assert!(!project.exists("lib"));
    }

    #[test]
    fn test_clean_removes_stale_outputs() {
        let _lock = hook_lock();
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib" } }"#),
            ("a.ts", "export const a = 1;\n"),
            ("lib/stale.js", "old"),
            ("es/stale.mjs", "old"),
        ]);
        build(&mut unit(&project, true)).unwrap();
        assert!(!project.exists("lib/stale.js"));
        assert!(!project.exists("es/stale.mjs"));
        assert!(project.exists("lib/a.js"));
        assert!(project.exists("es/a.mjs"));
    }

    #[test]
    fn test_commonjs_overrides_pin_the_module() {
        let options = CompilerOptions {
            target: Some(tsdual_toolchain::ScriptTarget::Es2020),
            ..CompilerOptions::default()
        };
        assert_eq!(options.module(), ModuleKind::Es2015);
        assert_eq!(options.merged(&commonjs_overrides()).module(), ModuleKind::CommonJs);
    }

    #[test]
    fn test_esm_overrides() {
        let options = esm_overrides("/p/es");
        assert_eq!(options.module, Some(ModuleKind::EsNext));
        assert_eq!(options.declaration, Some(false));
        assert_eq!(options.no_resolve, Some(true));
        assert_eq!(options.no_lib, Some(true));
        assert_eq!(options.out_dir.as_deref(), Some(Path::new("/p/es")));
    }
}
