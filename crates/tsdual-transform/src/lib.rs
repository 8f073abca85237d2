//! Syntax tree rewrites that make one TypeScript source tree emit well as
//! both CommonJS and ES modules.
//!
//! - [`SplitEnumExports`] runs before CommonJS emit so exported enums are
//!   exported by a plain assignment.
//! - [`HoistExports`] runs after CommonJS emit and makes the default export
//!   the value `require()` returns.
//! - [`ResolveModulePaths`] runs after ES module emit and points relative
//!   imports at the emitted `.mjs` files.

pub mod enum_split;
pub mod hoist;
pub mod resolve_paths;

pub use enum_split::{split_enum_exports, SplitEnumExports};
pub use hoist::{hoist_exports, HoistExports};
pub use resolve_paths::{resolve_module_paths, ResolveModulePaths};

use tsdual_toolchain::CustomTransformers;

/// Transformers for the CommonJS pass.
pub fn commonjs_transformers() -> CustomTransformers {
    CustomTransformers::new().before(SplitEnumExports).after(HoistExports)
}

/// Transformers for the ES module pass.
pub fn esm_transformers() -> CustomTransformers {
    CustomTransformers::new().after(ResolveModulePaths)
}
