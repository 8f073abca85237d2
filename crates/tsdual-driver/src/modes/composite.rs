use std::rc::Rc;

use tracing::{debug, info};
use tsdual_toolchain::{BuildOptions, CancellationToken, CompilerOptions, ParsedConfig, SolutionBuilder};

use super::companion::write_companion_configs;
use super::{build_cjs, BuildSettings, ProjectMode, CREATE_ESM, EMIT_ESM};
use crate::error::{BuildError, BuildResult};
use crate::mjs_guard::MjsExtensionGuard;
use crate::progress::Progress;
use crate::unit::{check_config_errors, check_requirements, commonjs_overrides, create_program, emit, BuildUnit};

const CLEAN_CJS: &str = "Cleaning up CommonJS emit results";
const CLEAN_ESM: &str = "Cleaning up ES Module emit results";
const WRITE_ESM_CONFIGS: &str = "Writing ES module configurations";

/// Incremental project references. Build info decides which projects are
/// stale; only those are rebuilt, CommonJS for all of them first and then
/// ES modules through generated companion configurations.
pub struct CompositeMode {
    root: ParsedConfig,
    settings: BuildSettings,
    token: Rc<dyn CancellationToken>,
    builder: SolutionBuilder,
}

impl CompositeMode {
    pub fn new(root: ParsedConfig, settings: BuildSettings, token: Rc<dyn CancellationToken>) -> BuildResult<Self> {
        let builder = solution_builder(&root.config_path, &commonjs_overrides())?;
        Ok(CompositeMode {
            root,
            settings,
            token,
            builder,
        })
    }

    /// Builds the CommonJS side of every stale project, returning their names.
    fn build_commonjs(&mut self, progress: &Progress) -> BuildResult<Vec<String>> {
        let mut built = Vec::new();
        while let Some(project) = self.builder.next_invalidated_project() {
            let name = project.config.name();
            info!(project = %name, status = %project.status, "building CommonJS");
            let mut unit = BuildUnit::new(project.config, false, Rc::clone(&self.token));
            build_cjs(&mut unit, self.settings, progress, Some(&name))?;
            unit.dispose();
            built.push(name);
        }
        Ok(built)
    }

    /// Builds the ES module side of every stale project, returning their names.
    fn build_esm(&self, progress: &Progress) -> BuildResult<Vec<String>> {
        let configs = self.builder.all_parsed_configs();
        let companions = progress.step(WRITE_ESM_CONFIGS, || write_companion_configs(&self.root, &configs))?;
        debug!(written = companions.written, "companion configurations ready");

        // the builder computes expected outputs, which must already be `.mjs`
        let _guard = MjsExtensionGuard::install();
        let mut builder = solution_builder(&companions.aggregator, &CompilerOptions::default())?;
        for config in builder.all_parsed_configs() {
            check_config_errors(config)?;
        }
        if self.settings.clean {
            progress.step(CLEAN_ESM, || {
                let removed = builder.clean()?;
                debug!(files = removed.len(), "removed ES module outputs");
                Ok(())
            })?;
        }

        let transformers = tsdual_transform::esm_transformers();
        let mut built = Vec::new();
        while let Some(project) = builder.next_invalidated_project() {
            let config = project.config;
            let name = companions
                .project_name(&config.config_path)
                .map(str::to_owned)
                .unwrap_or_else(|| config.name());
            info!(project = %name, status = %project.status, "building ES modules");
            let program = progress.step_in(CREATE_ESM, Some(&name), || {
                Ok(create_program(&config, config.options.clone()))
            })?;
            progress.step_in(EMIT_ESM, Some(&name), || {
                emit(&program, Some(&transformers), self.token.as_ref(), "Error emitting ES modules")
            })?;
            built.push(name);
        }
        Ok(built)
    }
}

fn solution_builder(root: &std::path::Path, overrides: &CompilerOptions) -> BuildResult<SolutionBuilder> {
    let builder = SolutionBuilder::new(&[root.to_path_buf()], overrides, BuildOptions::default())?;
    if let Err(error) = builder.build_order() {
        debug!(%error, "no build order");
        return Err(BuildError::CircularBuildOrder);
    }
    Ok(builder)
}

impl ProjectMode for CompositeMode {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn check_requirements(&self) -> BuildResult<()> {
        for config in self.builder.all_parsed_configs() {
            check_config_errors(config)?;
            if !config.file_names.is_empty() {
                check_requirements(config)?;
            }
        }
        Ok(())
    }

    fn build(&mut self, progress: &Progress) -> BuildResult<()> {
        if self.settings.clean {
            progress.step(CLEAN_CJS, || {
                let removed = self.builder.clean()?;
                debug!(files = removed.len(), "removed CommonJS outputs");
                Ok(())
            })?;
        }
        let cjs = self.build_commonjs(progress)?;
        let esm = self.build_esm(progress)?;
        info!(commonjs = cjs.len(), esm = esm.len(), "projects built");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hook_lock, Project};
    use pretty_assertions::assert_eq;
    use tsdual_toolchain::{parse_config, NeverCancelled};

    const ROOT: &str = r#"{ "files": [], "references": [{ "path": "./app" }, { "path": "./core" }] }"#;
    const CORE: &str = r#"{ "compilerOptions": { "composite": true, "isolatedModules": true, "outDir": "lib", "target": "es2020" }, "include": ["src"] }"#;
    const APP: &str = r#"{
        "compilerOptions": { "composite": true, "isolatedModules": true, "outDir": "lib", "target": "es2020" },
        "include": ["src"],
        "references": [{ "path": "../core" }]
    }"#;

    fn fixture() -> Project {
        Project::new(&[
            ("tsconfig.json", ROOT),
            ("app/tsconfig.json", APP),
            ("app/src/main.ts", "import { helper } from './helper';\nexport default helper;\n"),
            ("app/src/helper.ts", "export const helper = () => 1;\n"),
            ("core/tsconfig.json", CORE),
            ("core/src/index.ts", "export const core = 1;\n"),
        ])
    }

    fn mode(project: &Project, clean: bool) -> CompositeMode {
        let root = parse_config(&project.path("tsconfig.json"), &CompilerOptions::default()).unwrap();
        let settings = BuildSettings {
            clean,
            ..BuildSettings::default()
        };
        CompositeMode::new(root, settings, Rc::new(NeverCancelled)).unwrap()
    }

    fn run(project: &Project, clean: bool) -> (Vec<String>, Vec<String>) {
        let mut mode = mode(project, clean);
        mode.check_requirements().unwrap();
        let progress = Progress::with_terminal(false);
        if clean {
            progress.step(CLEAN_CJS, || Ok(mode.builder.clean()?)).unwrap();
        }
        let cjs = mode.build_commonjs(&progress).unwrap();
        let esm = mode.build_esm(&progress).unwrap();
        (cjs, esm)
    }

    #[test]
    fn test_builds_both_formats_in_reference_order() {
        let _lock = hook_lock();
        let project = fixture();
        let (cjs, esm) = run(&project, false);
        assert_eq!(cjs, vec!["core", "app"]);
        assert_eq!(esm, vec!["core", "app"]);

        for output in ["core/lib/src/index.js", "core/es/src/index.mjs", "app/lib/src/main.js", "app/es/src/main.mjs"] {
            assert!(project.exists(output), "missing {}", output);
        }
        let main = project.read("app/lib/src/main.js");
        assert!(main.contains("module.exports = exports ="), "{}", main);
        let main = project.read("app/es/src/main.mjs");
        assert!(main.contains("from \"./helper.mjs\""), "{}", main);
        assert!(project.exists("core/tsconfig.tsdual-esm.tsbuildinfo"));
    }

    #[test]
    fn test_up_to_date_projects_are_skipped() {
        let _lock = hook_lock();
        let project = fixture();
        run(&project, false);
        let (cjs, esm) = run(&project, false);
        assert!(cjs.is_empty(), "{:?}", cjs);
        assert!(esm.is_empty(), "{:?}", esm);

        project.write("app/src/helper.ts", "export const helper = () => 2;\n");
        let (cjs, esm) = run(&project, false);
        assert_eq!(cjs, vec!["app"]);
        assert_eq!(esm, vec!["app"]);
    }

    #[test]
    fn test_clean_rebuilds_everything() {
        let _lock = hook_lock();
        let project = fixture();
        run(&project, false);
        let (cjs, esm) = run(&project, true);
        assert_eq!(cjs, vec!["core", "app"]);
        assert_eq!(esm, vec!["core", "app"]);
        assert!(project.exists("app/es/src/main.mjs"));
    }

    #[test]
    fn test_whole_build_through_the_mode() {
        let _lock = hook_lock();
        let project = fixture();
        let mut mode = mode(&project, true);
        mode.check_requirements().unwrap();
        mode.build(&Progress::with_terminal(false)).unwrap();
        assert!(project.exists("core/es/src/index.mjs"));
        assert!(project.exists("node_modules/.cache/tsdual/tsconfig.esm.json"));
    }

    #[test]
    fn test_cycle_is_not_supported() {
        let project = Project::new(&[
            ("tsconfig.json", r#"{ "compilerOptions": { "composite": true }, "files": [], "references": [{ "path": "./a" }] }"#),
            ("a/tsconfig.json", r#"{ "compilerOptions": { "composite": true }, "references": [{ "path": "../b" }] }"#),
            ("a/x.ts", ""),
            ("b/tsconfig.json", r#"{ "compilerOptions": { "composite": true }, "references": [{ "path": "../a" }] }"#),
            ("b/y.ts", ""),
        ]);
        let root = parse_config(&project.path("tsconfig.json"), &CompilerOptions::default()).unwrap();
        let Err(error) = CompositeMode::new(root, BuildSettings::default(), Rc::new(NeverCancelled)) else {
            panic!("expected a cycle error");
        };
        assert_eq!(error.to_string(), "Circular build order currently not supported");
    }
}
