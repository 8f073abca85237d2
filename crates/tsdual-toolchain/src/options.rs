//! `compilerOptions` as read from `tsconfig.json`.
//!
//! Every field is optional so option sets layer the way `extends` and
//! command-line overrides do: [`CompilerOptions::merged`] keeps the base
//! value wherever the override leaves a field unset.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tsdual_emit::{LowerOptions, ModuleKind, ScriptTarget};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    #[serde(
        deserialize_with = "from_str_option",
        serialize_with = "display_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<ScriptTarget>,
    #[serde(
        deserialize_with = "from_str_option",
        serialize_with = "display_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub module: Option<ModuleKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolated_modules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_build_info_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_resolve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_lib: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_emit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub es_module_interop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// The file these options were read from; never read from JSON
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

impl CompilerOptions {
    /// `self` with every option `overrides` sets replaced.
    pub fn merged(&self, overrides: &CompilerOptions) -> CompilerOptions {
        macro_rules! pick {
            ($($field:ident),* $(,)?) => {
                CompilerOptions {
                    $($field: overrides.$field.clone().or_else(|| self.$field.clone()),)*
                }
            };
        }
        pick!(
            target,
            module,
            out_dir,
            root_dir,
            declaration,
            declaration_dir,
            isolated_modules,
            composite,
            incremental,
            ts_build_info_file,
            no_resolve,
            no_lib,
            no_emit,
            es_module_interop,
            always_strict,
            strict,
            config_file_path,
        )
    }

    /// Makes every path option absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.out_dir,
            &mut self.root_dir,
            &mut self.declaration_dir,
            &mut self.ts_build_info_file,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = normalize(&base.join(&*path));
            }
        }
    }

    pub fn target(&self) -> ScriptTarget {
        self.target.unwrap_or_default()
    }

    /// `module` falls back on the target: ES2015 modules from ES2015 on.
    pub fn module(&self) -> ModuleKind {
        self.module.unwrap_or(if self.target() >= ScriptTarget::Es2015 {
            ModuleKind::Es2015
        } else {
            ModuleKind::CommonJs
        })
    }

    pub fn is_incremental(&self) -> bool {
        self.incremental.or(self.composite).unwrap_or(false)
    }

    pub fn lower_options(&self) -> LowerOptions {
        LowerOptions {
            module: self.module(),
            target: self.target(),
            es_module_interop: self.es_module_interop.unwrap_or(false),
            always_strict: self.always_strict.or(self.strict).unwrap_or(false),
        }
    }
}

/// Lexically removes `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn from_str_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    value
        .map(|text| text.parse::<T>().map_err(serde::de::Error::custom))
        .transpose()
}

fn display_option<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Display,
{
    match value {
        Some(value) => serializer.serialize_str(&value.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_case_insensitive_enums() {
        let options: CompilerOptions =
            json5::from_str(r#"{ target: "ES2019", module: "commonjs", outDir: "dist", isolatedModules: true }"#)
                .unwrap();
        assert_eq!(options.target, Some(ScriptTarget::Es2019));
        assert_eq!(options.module, Some(ModuleKind::CommonJs));
        assert_eq!(options.out_dir, Some(PathBuf::from("dist")));
        assert_eq!(options.isolated_modules, Some(true));
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        assert!(json5::from_str::<CompilerOptions>(r#"{ target: "es1999" }"#).is_err());
    }

    #[test]
    fn test_merged_prefers_overrides() {
        let base = CompilerOptions {
            out_dir: Some(PathBuf::from("/p/dist")),
            declaration: Some(true),
            ..CompilerOptions::default()
        };
        let overrides = CompilerOptions {
            out_dir: Some(PathBuf::from("/p/es")),
            module: Some(ModuleKind::EsNext),
            ..CompilerOptions::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.out_dir, Some(PathBuf::from("/p/es")));
        assert_eq!(merged.declaration, Some(true));
        assert_eq!(merged.module(), ModuleKind::EsNext);
    }

    #[test]
    fn test_module_defaults_follow_target() {
        let es5 = CompilerOptions::default();
        assert_eq!(es5.module(), ModuleKind::CommonJs);
        let modern = CompilerOptions {
            target: Some(ScriptTarget::Es2020),
            ..CompilerOptions::default()
        };
        assert_eq!(modern.module(), ModuleKind::Es2015);
    }

    #[test]
    fn test_resolve_paths() {
        let mut options = CompilerOptions {
            out_dir: Some(PathBuf::from("../build/./lib")),
            ..CompilerOptions::default()
        };
        options.resolve_paths(Path::new("/repo/packages/a"));
        assert_eq!(options.out_dir, Some(PathBuf::from("/repo/packages/build/lib")));
    }

    #[test]
    fn test_serializes_enums_as_strings() {
        let options = CompilerOptions {
            module: Some(ModuleKind::EsNext),
            no_lib: Some(true),
            ..CompilerOptions::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json, serde_json::json!({ "module": "ESNext", "noLib": true }));
    }
}
