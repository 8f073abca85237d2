//! Builds over a tree of project references.
//!
//! A [`SolutionBuilder`] loads every configuration reachable from its
//! roots, orders them dependencies first, and decides once which of them
//! need rebuilding by comparing their `.tsbuildinfo` with what is on disk.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::buildinfo::{build_info_path, hash_file, options_hash, BuildInfo, BUILD_INFO_VERSION};
use crate::config::{parse_config, ParsedConfig};
use crate::emit_hook::{declaration_output_file_path, own_emit_output_file_path};
use crate::error::{ConfigResult, Result, ToolchainError};
use crate::options::CompilerOptions;
use crate::program::common_source_directory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpToDateStatus {
    UpToDate,
    OutOfDate { reason: String },
    OutOfDateWithUpstream { upstream: PathBuf },
    /// Only references other projects; nothing to build
    ContainerOnly,
}

impl UpToDateStatus {
    fn out_of_date(reason: impl Into<String>) -> Self {
        UpToDateStatus::OutOfDate {
            reason: reason.into(),
        }
    }

    pub fn needs_build(&self) -> bool {
        matches!(
            self,
            UpToDateStatus::OutOfDate { .. } | UpToDateStatus::OutOfDateWithUpstream { .. }
        )
    }
}

impl fmt::Display for UpToDateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpToDateStatus::UpToDate => write!(f, "up to date"),
            UpToDateStatus::OutOfDate { reason } => write!(f, "out of date: {}", reason),
            UpToDateStatus::OutOfDateWithUpstream { upstream } => {
                write!(f, "out of date: its dependency '{}' is out of date", upstream.display())
            }
            UpToDateStatus::ContainerOnly => write!(f, "a container project"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Treat every project as out of date
    pub force: bool,
}

/// A project the builder wants built next.
#[derive(Debug, Clone)]
pub struct InvalidatedProject {
    pub config: ParsedConfig,
    pub status: UpToDateStatus,
}

pub struct SolutionBuilder {
    build_options: BuildOptions,
    configs: HashMap<PathBuf, ParsedConfig>,
    discovered: Vec<PathBuf>,
    order: std::result::Result<Vec<PathBuf>, Vec<PathBuf>>,
    statuses: HashMap<PathBuf, UpToDateStatus>,
    cursor: usize,
}

impl SolutionBuilder {
    /// Loads `roots` and everything they reference.
    pub fn new(roots: &[PathBuf], overrides: &CompilerOptions, build_options: BuildOptions) -> ConfigResult<Self> {
        let mut configs = HashMap::new();
        let mut discovered = Vec::new();
        let mut pending: Vec<PathBuf> = roots.iter().rev().cloned().collect();
        while let Some(path) = pending.pop() {
            let config = parse_config(&path, overrides)?;
            if configs.contains_key(&config.config_path) {
                continue;
            }
            for reference in config.project_references.iter().rev() {
                pending.push(reference.path.clone());
            }
            discovered.push(config.config_path.clone());
            configs.insert(config.config_path.clone(), config);
        }

        let order = topological_order(&discovered, &configs);
        let mut builder = SolutionBuilder {
            build_options,
            configs,
            discovered,
            order,
            statuses: HashMap::new(),
            cursor: 0,
        };
        builder.compute_statuses();
        Ok(builder)
    }

    /// Configurations in the order they must be built.
    pub fn build_order(&self) -> Result<&[PathBuf]> {
        self.order
            .as_deref()
            .map_err(|cycle| ToolchainError::CircularReference(cycle.clone()))
    }

    /// Every loaded configuration, in build order when there is one.
    pub fn all_parsed_configs(&self) -> Vec<&ParsedConfig> {
        let paths = self.order.as_ref().unwrap_or(&self.discovered);
        paths.iter().filter_map(|path| self.configs.get(path)).collect()
    }

    pub fn parsed_config(&self, path: &Path) -> Option<&ParsedConfig> {
        self.configs.get(path)
    }

    pub fn up_to_date_status(&self, config_path: &Path) -> UpToDateStatus {
        self.statuses
            .get(config_path)
            .cloned()
            .unwrap_or_else(|| UpToDateStatus::out_of_date("project is not part of this build"))
    }

    /// The next project in build order that needs building, or every
    /// buildable project in turn when forced.
    pub fn next_invalidated_project(&mut self) -> Option<InvalidatedProject> {
        let order = self.order.as_ref().ok()?;
        while let Some(path) = order.get(self.cursor) {
            self.cursor += 1;
            let status = self.up_to_date_status(path);
            let wanted = match status {
                UpToDateStatus::ContainerOnly => false,
                UpToDateStatus::UpToDate => self.build_options.force,
                _ => true,
            };
            if !wanted {
                debug!(config = %path.display(), %status, "skipping project");
                continue;
            }
            if let Some(config) = self.configs.get(path) {
                return Some(InvalidatedProject {
                    config: config.clone(),
                    status,
                });
            }
        }
        None
    }

    /// Deletes every output of every project and marks them all out of date.
    pub fn clean(&mut self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for config in self.all_parsed_configs() {
            for output in expected_outputs(config) {
                match fs::remove_file(&output) {
                    Ok(()) => removed.push(output),
                    Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                    Err(source) => return Err(ToolchainError::Remove { path: output, source }),
                }
            }
        }
        for (path, status) in self.statuses.iter_mut() {
            if *status != UpToDateStatus::ContainerOnly {
                *status = UpToDateStatus::out_of_date("outputs were cleaned");
            }
            debug!(config = %path.display(), "cleaned project");
        }
        Ok(removed)
    }

    fn compute_statuses(&mut self) {
        let paths = self.order.as_ref().unwrap_or(&self.discovered).clone();
        for path in paths {
            let status = match self.configs.get(&path) {
                Some(config) => self.status_of(config),
                None => continue,
            };
            debug!(config = %path.display(), %status, "computed status");
            self.statuses.insert(path, status);
        }
    }

    fn status_of(&self, config: &ParsedConfig) -> UpToDateStatus {
        if config.file_names.is_empty() {
            return UpToDateStatus::ContainerOnly;
        }
        let Some(info_path) = build_info_path(&config.options) else {
            return UpToDateStatus::out_of_date("project has no build info file");
        };
        let info = match BuildInfo::read(&info_path) {
            Ok(Some(info)) => info,
            Ok(None) => {
                return UpToDateStatus::out_of_date(format!(
                    "output file '{}' does not exist",
                    info_path.display()
                ))
            }
            Err(error) => return UpToDateStatus::out_of_date(error.to_string()),
        };

        if info.version != BUILD_INFO_VERSION {
            return UpToDateStatus::out_of_date("it was built with a different version");
        }
        if info.options_hash != options_hash(&config.options) {
            return UpToDateStatus::out_of_date("compiler options changed");
        }
        for file in &config.file_names {
            if !info.files.contains_key(file.to_string_lossy().as_ref()) {
                return UpToDateStatus::out_of_date(format!("'{}' is new", file.display()));
            }
        }
        for (file, hash) in &info.files {
            if hash_file(Path::new(file)).as_ref() != Some(hash) {
                return UpToDateStatus::out_of_date(format!("'{}' has changed", file));
            }
        }
        for output in &info.outputs {
            if !Path::new(output).is_file() {
                return UpToDateStatus::out_of_date(format!("output file '{}' does not exist", output));
            }
        }

        for reference in &config.project_references {
            let upstream_changed = match self.statuses.get(&reference.path) {
                Some(UpToDateStatus::UpToDate) | Some(UpToDateStatus::ContainerOnly) => false,
                _ => true,
            };
            let recorded_changed = self
                .configs
                .get(&reference.path)
                .and_then(|upstream| build_info_path(&upstream.options))
                .is_some_and(|path| {
                    info.references.get(path.to_string_lossy().as_ref()) != hash_file(&path).as_ref()
                });
            if upstream_changed || recorded_changed {
                return UpToDateStatus::OutOfDateWithUpstream {
                    upstream: reference.path.clone(),
                };
            }
        }
        UpToDateStatus::UpToDate
    }
}

/// Files a build of `config` writes, computed from its inputs and from
/// what its build info recorded.
fn expected_outputs(config: &ParsedConfig) -> Vec<PathBuf> {
    if config.file_names.is_empty() {
        return Vec::new();
    }
    let options = &config.options;
    let common_dir = common_source_directory(
        options,
        config.file_names.iter().map(PathBuf::as_path),
        config.config_dir(),
    );
    let mut outputs = Vec::new();
    for file in config
        .file_names
        .iter()
        .filter(|file| !crate::config::is_declaration_file(file))
    {
        outputs.push(own_emit_output_file_path(file, options, &common_dir));
        if options.declaration.unwrap_or(false) {
            outputs.push(declaration_output_file_path(file, options, &common_dir));
        }
    }
    if let Some(info_path) = build_info_path(options) {
        if let Ok(Some(info)) = BuildInfo::read(&info_path) {
            outputs.extend(info.outputs.iter().map(PathBuf::from));
        }
        outputs.push(info_path);
    }
    let mut seen = HashSet::new();
    outputs.retain(|path| seen.insert(path.clone()));
    outputs
}

/// Depth-first post-order over references, so every project comes after
/// the projects it references. Returns the offending path on a cycle.
fn topological_order(
    discovered: &[PathBuf],
    configs: &HashMap<PathBuf, ParsedConfig>,
) -> std::result::Result<Vec<PathBuf>, Vec<PathBuf>> {
    fn visit(
        path: &PathBuf,
        configs: &HashMap<PathBuf, ParsedConfig>,
        done: &mut HashSet<PathBuf>,
        stack: &mut Vec<PathBuf>,
        order: &mut Vec<PathBuf>,
    ) -> std::result::Result<(), Vec<PathBuf>> {
        if done.contains(path) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|p| p == path) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(path.clone());
            return Err(cycle);
        }
        stack.push(path.clone());
        if let Some(config) = configs.get(path) {
            for reference in &config.project_references {
                visit(&reference.path, configs, done, stack, order)?;
            }
        }
        stack.pop();
        done.insert(path.clone());
        order.push(path.clone());
        Ok(())
    }

    let mut done = HashSet::new();
    let mut order = Vec::new();
    for path in discovered {
        visit(path, configs, &mut done, &mut Vec::new(), &mut order)?;
    }
    Ok(order)
}
