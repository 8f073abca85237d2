use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use tracing::{debug, info};
use tsdual_toolchain::{parse_config, CancellationToken, CompilerOptions, ParsedConfig};

use super::{build_unit, BuildSettings, ProjectMode};
use crate::error::{BuildError, BuildResult};
use crate::graph::BuildGraph;
use crate::progress::Progress;
use crate::unit::{check_config_errors, BuildUnit};

/// Referenced projects built one at a time, dependencies first. Each
/// project finishes both formats before the next one starts, so a project
/// always compiles against its references' emitted output.
pub struct MultiSimpleMode {
    settings: BuildSettings,
    units: HashMap<PathBuf, BuildUnit>,
    order: Vec<PathBuf>,
}

impl MultiSimpleMode {
    /// Loads every project `root` references, directly or through other
    /// references.
    pub fn new(root: ParsedConfig, settings: BuildSettings, token: Rc<dyn CancellationToken>) -> BuildResult<Self> {
        let mut graph = BuildGraph::new();
        let mut configs: HashMap<PathBuf, ParsedConfig> = HashMap::new();
        let mut pending: VecDeque<PathBuf> = root
            .project_references
            .iter()
            .map(|reference| reference.path.clone())
            .collect();

        while let Some(path) = pending.pop_front() {
            if configs.contains_key(&path) {
                continue;
            }
            let config = parse_config(&path, &CompilerOptions::default())?;
            graph.add_project(&path);
            for reference in &config.project_references {
                graph.add_dependency(&path, &reference.path);
                pending.push_back(reference.path.clone());
            }
            configs.insert(path, config);
        }

        let order = graph.build_order()?;
        debug!(projects = order.len(), "ordered referenced projects");
        let units = configs
            .into_iter()
            .map(|(path, config)| (path, BuildUnit::new(config, settings.clean, Rc::clone(&token))))
            .collect();
        Ok(MultiSimpleMode { settings, units, order })
    }

    pub fn order(&self) -> &[PathBuf] {
        &self.order
    }

    fn units_in_order(&self) -> BuildResult<impl Iterator<Item = &BuildUnit>> {
        if self.order.is_empty() {
            return Err(BuildError::EmptyProjectOrder);
        }
        Ok(self.order.iter().filter_map(|path| self.units.get(path)))
    }
}

impl ProjectMode for MultiSimpleMode {
    fn name(&self) -> &'static str {
        "multi-simple"
    }

    fn check_requirements(&self) -> BuildResult<()> {
        for unit in self.units_in_order()? {
            check_config_errors(unit.config())?;
            unit.check_requirements()?;
        }
        Ok(())
    }

    fn build(&mut self, progress: &Progress) -> BuildResult<()> {
        if self.order.is_empty() {
            return Err(BuildError::EmptyProjectOrder);
        }
        for path in &self.order {
            let Some(unit) = self.units.get_mut(path) else {
                continue;
            };
            let name = unit.name();
            info!(project = %name, "building project");
            build_unit(unit, self.settings, progress, Some(&name))?;
        }
        Ok(())
    }
}
