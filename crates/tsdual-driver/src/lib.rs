//! tsdual build driver
//!
//! Compiles a TypeScript project, or a tree of project references, twice:
//! to CommonJS `.js` files in the configured `outDir`, and to ES module
//! `.mjs` files in an `es` directory beside it.
//!
//! A [`BuildUnit`] holds one project's two compilations and enforces their
//! order. The [`modes`] decide how units are created and sequenced for a
//! root configuration, and [`compile`] runs the whole thing.

pub mod error;
pub mod graph;
pub mod mjs_guard;
pub mod modes;
pub mod orchestrator;
pub mod progress;
pub mod unit;

pub use error::{BuildError, BuildResult};
pub use graph::BuildGraph;
pub use mjs_guard::MjsExtensionGuard;
pub use modes::{select_mode, BuildSettings, CompositeMode, MultiSimpleMode, ProjectMode, SimpleMode};
pub use orchestrator::{compile, locate_config};
pub use progress::Progress;
pub use unit::{BuildUnit, UnitState};

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use tempfile::TempDir;

    static HOOK_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that emit, since the output extension hook is
    /// shared by the whole process.
    pub fn hook_lock() -> MutexGuard<'static, ()> {
        HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A project laid out in a temporary directory.
    pub struct Project {
        dir: TempDir,
    }

    impl Project {
        pub fn new(files: &[(&str, &str)]) -> Self {
            let project = Project {
                dir: tempfile::tempdir().unwrap(),
            };
            for (path, contents) in files {
                project.write(path, contents);
            }
            project
        }

        pub fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        pub fn write(&self, relative: &str, contents: &str) {
            let path = self.path(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        pub fn read(&self, relative: &str) -> String {
            fs::read_to_string(self.path(relative)).unwrap()
        }

        pub fn exists(&self, relative: &str) -> bool {
            self.path(relative).exists()
        }

        /// The base name of the project directory.
        pub fn name(&self) -> String {
            self.dir
                .path()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }
    }
}
