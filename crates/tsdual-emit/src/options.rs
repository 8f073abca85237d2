//! Output settings consumed by the lowering passes.

use std::fmt;
use std::str::FromStr;

/// `target` compiler option. Ordered so `target >= ScriptTarget::Es2015`
/// reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ScriptTarget {
    Es3,
    #[default]
    Es5,
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
    Es2023,
    EsNext,
}

impl ScriptTarget {
    /// Keyword for synthesized bindings: `const` where the target has it.
    pub fn binding_keyword(self) -> tsdual_ast::VarDeclKind {
        if self >= ScriptTarget::Es2015 {
            tsdual_ast::VarDeclKind::Const
        } else {
            tsdual_ast::VarDeclKind::Var
        }
    }
}

impl FromStr for ScriptTarget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let target = match value.to_ascii_lowercase().as_str() {
            "es3" => ScriptTarget::Es3,
            "es5" => ScriptTarget::Es5,
            "es6" | "es2015" => ScriptTarget::Es2015,
            "es2016" => ScriptTarget::Es2016,
            "es2017" => ScriptTarget::Es2017,
            "es2018" => ScriptTarget::Es2018,
            "es2019" => ScriptTarget::Es2019,
            "es2020" => ScriptTarget::Es2020,
            "es2021" => ScriptTarget::Es2021,
            "es2022" => ScriptTarget::Es2022,
            "es2023" => ScriptTarget::Es2023,
            "esnext" => ScriptTarget::EsNext,
            other => return Err(format!("Argument for '--target' option must be a known target, got '{}'.", other)),
        };
        Ok(target)
    }
}

impl fmt::Display for ScriptTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptTarget::Es3 => "ES3",
            ScriptTarget::Es5 => "ES5",
            ScriptTarget::Es2015 => "ES2015",
            ScriptTarget::Es2016 => "ES2016",
            ScriptTarget::Es2017 => "ES2017",
            ScriptTarget::Es2018 => "ES2018",
            ScriptTarget::Es2019 => "ES2019",
            ScriptTarget::Es2020 => "ES2020",
            ScriptTarget::Es2021 => "ES2021",
            ScriptTarget::Es2022 => "ES2022",
            ScriptTarget::Es2023 => "ES2023",
            ScriptTarget::EsNext => "ESNext",
        };
        f.write_str(name)
    }
}

/// `module` compiler option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModuleKind {
    #[default]
    CommonJs,
    Es2015,
    Es2020,
    Es2022,
    EsNext,
    Node16,
    NodeNext,
}

impl ModuleKind {
    /// Whether output keeps `import`/`export` syntax. The Node kinds emit
    /// CommonJS for `.ts` sources.
    pub fn is_es_module(self) -> bool {
        matches!(
            self,
            ModuleKind::Es2015 | ModuleKind::Es2020 | ModuleKind::Es2022 | ModuleKind::EsNext
        )
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let kind = match value.to_ascii_lowercase().as_str() {
            "commonjs" => ModuleKind::CommonJs,
            "es6" | "es2015" => ModuleKind::Es2015,
            "es2020" => ModuleKind::Es2020,
            "es2022" => ModuleKind::Es2022,
            "esnext" => ModuleKind::EsNext,
            "node16" => ModuleKind::Node16,
            "nodenext" => ModuleKind::NodeNext,
            other => return Err(format!("Argument for '--module' option must be a known module kind, got '{}'.", other)),
        };
        Ok(kind)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleKind::CommonJs => "CommonJS",
            ModuleKind::Es2015 => "ES2015",
            ModuleKind::Es2020 => "ES2020",
            ModuleKind::Es2022 => "ES2022",
            ModuleKind::EsNext => "ESNext",
            ModuleKind::Node16 => "Node16",
            ModuleKind::NodeNext => "NodeNext",
        };
        f.write_str(name)
    }
}

/// Settings for one lowering run.
#[derive(Debug, Clone, Default)]
pub struct LowerOptions {
    pub module: ModuleKind,
    pub target: ScriptTarget,
    pub es_module_interop: bool,
    /// Emit `"use strict"` in files that are not modules.
    pub always_strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_ordering_and_parsing() {
        assert_eq!("ES6".parse::<ScriptTarget>(), Ok(ScriptTarget::Es2015));
        assert_eq!("esnext".parse::<ScriptTarget>(), Ok(ScriptTarget::EsNext));
        assert!(ScriptTarget::Es2020 >= ScriptTarget::Es2015);
        assert_eq!(ScriptTarget::Es5.binding_keyword(), tsdual_ast::VarDeclKind::Var);
        assert!("es1".parse::<ScriptTarget>().is_err());
    }

    #[test]
    fn test_module_kind() {
        assert_eq!("CommonJS".parse::<ModuleKind>(), Ok(ModuleKind::CommonJs));
        assert!("ESNext".parse::<ModuleKind>().map(ModuleKind::is_es_module).unwrap_or(false));
        assert!(!ModuleKind::NodeNext.is_es_module());
    }
}
