use std::rc::Rc;

use tsdual_toolchain::{CancellationToken, ParsedConfig};

use super::{build_unit, BuildSettings, ProjectMode};
use crate::error::BuildResult;
use crate::progress::Progress;
use crate::unit::{check_config_errors, BuildUnit};

/// A single project built straight through both formats.
pub struct SimpleMode {
    unit: BuildUnit,
    settings: BuildSettings,
}

impl SimpleMode {
    pub fn new(config: ParsedConfig, settings: BuildSettings, token: Rc<dyn CancellationToken>) -> Self {
        SimpleMode {
            unit: BuildUnit::new(config, settings.clean, token),
            settings,
        }
    }
}

impl ProjectMode for SimpleMode {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn check_requirements(&self) -> BuildResult<()> {
        check_config_errors(self.unit.config())?;
        self.unit.check_requirements()
    }

    fn build(&mut self, progress: &Progress) -> BuildResult<()> {
        build_unit(&mut self.unit, self.settings, progress, None)
    }
}
