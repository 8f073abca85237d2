//! ES module companions of composite projects.
//!
//! Each project that has files gets a configuration that extends its own
//! and redirects it to ES module output, written under
//! `node_modules/.cache/tsdual/` next to the root configuration. A root
//! `tsconfig.esm.json` references all of them, so a solution builder over
//! it orders and tracks the ES module builds the same way the CommonJS
//! builds are.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use tsdual_toolchain::{CompilerOptions, ModuleKind, ParsedConfig};

use crate::error::{BuildError, BuildResult};

/// Where companion configurations live, relative to the root configuration.
pub const CACHE_DIR: &str = "node_modules/.cache/tsdual";
const AGGREGATOR: &str = "tsconfig.esm.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompanionFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler_options: Option<CompilerOptions>,
    files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include: Option<Vec<String>>,
    references: Vec<Reference>,
}

#[derive(Debug, Serialize)]
struct Reference {
    path: PathBuf,
}

/// The companion files of one run.
#[derive(Debug, Default)]
pub struct CompanionConfigs {
    /// The root `tsconfig.esm.json`
    pub aggregator: PathBuf,
    /// Companion path to the name of the project it was derived from
    names: HashMap<PathBuf, String>,
    /// How many files had to be (re)written
    pub written: usize,
}

impl CompanionConfigs {
    pub fn project_name(&self, companion: &Path) -> Option<&str> {
        self.names.get(companion).map(String::as_str)
    }
}

/// Writes a companion for every project in `projects` that has files, plus
/// the aggregator. Files whose contents would not change are left alone.
pub fn write_companion_configs(root: &ParsedConfig, projects: &[&ParsedConfig]) -> BuildResult<CompanionConfigs> {
    let cache_dir = root.config_dir().join(CACHE_DIR);
    let projects: Vec<&ParsedConfig> = projects
        .iter()
        .copied()
        .filter(|config| !config.file_names.is_empty())
        .collect();
    let companions: HashMap<&Path, PathBuf> = projects
        .iter()
        .map(|config| (config.config_path.as_path(), cache_dir.join(companion_file_name(config))))
        .collect();

    let mut result = CompanionConfigs {
        aggregator: cache_dir.join(AGGREGATOR),
        ..CompanionConfigs::default()
    };
    let mut all = Vec::new();
    for config in &projects {
        let Some(path) = companions.get(config.config_path.as_path()) else {
            continue;
        };
        let references = config
            .project_references
            .iter()
            .filter_map(|reference| companions.get(reference.path.as_path()))
            .map(|path| Reference { path: path.clone() })
            .collect();
        let companion = CompanionFile {
            extends: Some(config.config_path.clone()),
            compiler_options: Some(companion_options(config)),
            files: config.file_names.clone(),
            include: Some(Vec::new()),
            references,
        };
        if write_if_changed(path, &companion)? {
            result.written += 1;
        }
        result.names.insert(path.clone(), config.name());
        all.push(Reference { path: path.clone() });
    }

    let aggregator = CompanionFile {
        extends: None,
        compiler_options: None,
        files: Vec::new(),
        include: None,
        references: all,
    };
    if write_if_changed(&result.aggregator, &aggregator)? {
        result.written += 1;
    }
    Ok(result)
}

/// `<project name>-<hash of its config path>.esm.json`
fn companion_file_name(config: &ParsedConfig) -> String {
    let digest = Sha256::digest(config.config_path.to_string_lossy().as_bytes());
    let hash = hex::encode(digest);
    format!("{}-{}.esm.json", config.name(), &hash[..8])
}

fn companion_options(config: &ParsedConfig) -> CompilerOptions {
    let config_dir = config.config_dir();
    let out_dir = match &config.options.out_dir {
        Some(out_dir) => out_dir.parent().unwrap_or(config_dir).join("es"),
        None => config_dir.join("es"),
    };
    let stem = config
        .config_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tsconfig".to_string());
    // keep the CommonJS layout once `composite` no longer pins the root
    let root_dir = config
        .options
        .root_dir
        .clone()
        .or_else(|| config.options.composite.unwrap_or(false).then(|| config_dir.to_path_buf()));

    CompilerOptions {
        out_dir: Some(out_dir),
        root_dir,
        module: Some(ModuleKind::EsNext),
        declaration: Some(false),
        composite: Some(false),
        incremental: Some(true),
        no_resolve: Some(true),
        no_lib: Some(true),
        ts_build_info_file: Some(config_dir.join(format!("{}.tsdual-esm.tsbuildinfo", stem))),
        ..CompilerOptions::default()
    }
}

fn write_if_changed(path: &Path, file: &CompanionFile) -> BuildResult<bool> {
    let mut contents = serde_json::to_string_pretty(file).map_err(|source| BuildError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    contents.push('\n');

    match fs::read_to_string(path) {
        Ok(existing) if existing == contents => {
            debug!(path = %path.display(), "companion configuration unchanged");
            return Ok(false);
        }
        Ok(_) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(BuildError::io("read", path, source)),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::io("create", parent, source))?;
    }
    fs::write(path, contents).map_err(|source| BuildError::io("write", path, source))?;
    debug!(path = %path.display(), "wrote companion configuration");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Project;
    use pretty_assertions::assert_eq;
    use tsdual_toolchain::{parse_config, SolutionBuilder};

    fn fixture() -> Project {
        Project::new(&[
            ("tsconfig.json", r#"{ "files": [], "references": [{ "path": "./app" }, { "path": "./core" }] }"#),
            (
                "app/tsconfig.json",
                r#"{ "compilerOptions": { "composite": true, "isolatedModules": true, "outDir": "lib" }, "references": [{ "path": "../core" }] }"#,
            ),
            ("app/src/main.ts", "export const main = 1;\n"),
            ("core/tsconfig.json", r#"{ "compilerOptions": { "composite": true, "isolatedModules": true, "outDir": "dist/cjs" } }"#),
            ("core/src/index.ts", "export const core = 1;\n"),
        ])
    }

    fn write(project: &Project) -> CompanionConfigs {
        let root_path = project.path("tsconfig.json");
        let root = parse_config(&root_path, &CompilerOptions::default()).unwrap();
        let builder = SolutionBuilder::new(&[root_path], &CompilerOptions::default(), Default::default()).unwrap();
        write_companion_configs(&root, &builder.all_parsed_configs()).unwrap()
    }

    #[test]
    fn test_companions_redirect_to_es_output() {
        let project = fixture();
        let companions = write(&project);
        assert_eq!(companions.written, 3);
        assert_eq!(companions.aggregator, project.path("node_modules/.cache/tsdual/tsconfig.esm.json"));

        let aggregator = parse_config(&companions.aggregator, &CompilerOptions::default()).unwrap();
        assert!(aggregator.errors.is_empty(), "{:?}", aggregator.errors);
        assert!(aggregator.file_names.is_empty());
        assert_eq!(aggregator.project_references.len(), 2);

        let core = aggregator
            .project_references
            .iter()
            .map(|reference| parse_config(&reference.path, &CompilerOptions::default()).unwrap())
            .find(|config| companions.project_name(&config.config_path) == Some("core"))
            .unwrap();
        let name = core.config_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("core-") && name.ends_with(".esm.json"), "{}", name);
        assert_eq!(core.file_names, vec![project.path("core/src/index.ts")]);
        assert_eq!(core.options.out_dir, Some(project.path("core/dist/es")));
        assert_eq!(core.options.module, Some(ModuleKind::EsNext));
        assert_eq!(core.options.composite, Some(false));
        assert_eq!(core.options.incremental, Some(true));
        assert_eq!(core.options.isolated_modules, Some(true));
        assert_eq!(core.options.root_dir, Some(project.path("core")));
        assert_eq!(
            core.options.ts_build_info_file,
            Some(project.path("core/tsconfig.tsdual-esm.tsbuildinfo"))
        );
    }

    #[test]
    fn test_companion_references_follow_project_references() {
        let project = fixture();
        let companions = write(&project);
        let aggregator = parse_config(&companions.aggregator, &CompilerOptions::default()).unwrap();
        for reference in &aggregator.project_references {
            let config = parse_config(&reference.path, &CompilerOptions::default()).unwrap();
            let expected = match companions.project_name(&config.config_path) {
                Some("app") => 1,
                Some("core") => 0,
                other => panic!("unexpected companion {:?}", other),
            };
            assert_eq!(config.project_references.len(), expected);
        }
    }

    #[test]
    fn test_unchanged_companions_are_not_rewritten() {
        let project = fixture();
        assert_eq!(write(&project).written, 3);
        assert_eq!(write(&project).written, 0);
    }
}
