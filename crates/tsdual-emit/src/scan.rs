//! Top-level binding survey shared by both module lowerings.

use std::collections::{HashMap, HashSet};

use tsdual_ast::*;

#[derive(Debug, Default)]
pub(crate) struct ModuleScan {
    /// Names that only exist at the type level
    pub type_names: HashSet<String>,
    /// Names bound at runtime by a top-level declaration
    pub value_names: HashSet<String>,
    /// Local bindings created by value imports
    pub import_locals: HashSet<String>,
    /// `export { local as exported }` without a source, by local name
    pub local_exports: HashMap<String, Vec<String>>,
}

impl ModuleScan {
    pub(crate) fn new(items: &[Node<ModuleItem>]) -> Self {
        let mut scan = Self::default();

        for item in items {
            match &item.value {
                ModuleItem::Import(import) => {
                    for specifier in &import.specifiers {
                        let type_only = import.type_only
                            || matches!(specifier, ImportSpecifier::Named { type_only: true, .. });
                        let local = specifier.local_name().to_string();
                        if type_only {
                            scan.type_names.insert(local);
                        } else {
                            scan.import_locals.insert(local);
                        }
                    }
                }
                ModuleItem::ImportEquals(decl) => {
                    let name = decl.name.value.name.clone();
                    if decl.type_only {
                        scan.type_names.insert(name);
                    } else {
                        scan.value_names.insert(name);
                    }
                }
                ModuleItem::Stmt(Stmt::Decl(decl)) => scan.add_decl(decl),
                ModuleItem::Export(ExportDecl::Decl(decl)) | ModuleItem::Export(ExportDecl::DefaultDecl { decl, .. }) => {
                    scan.add_decl(&decl.value)
                }
                ModuleItem::Export(ExportDecl::Named {
                    specifiers,
                    source: None,
                    type_only: false,
                }) => {
                    for specifier in specifiers.iter().filter(|s| !s.type_only) {
                        scan.local_exports
                            .entry(specifier.local.value.name.clone())
                            .or_default()
                            .push(specifier.exported_name().to_string());
                    }
                }
                _ => {}
            }
        }

        let type_names = &scan.type_names;
        let value_names = &scan.value_names;
        scan.local_exports
            .retain(|local, _| !(type_names.contains(local) && !value_names.contains(local)));
        scan
    }

    fn add_decl(&mut self, decl: &Decl) {
        let names = decl.declared_names();
        if decl.is_type_only() {
            self.type_names.extend(names);
        } else {
            self.value_names.extend(names);
        }
    }

    /// Whether `name` refers to nothing at runtime.
    pub(crate) fn is_type_only(&self, name: &str) -> bool {
        self.type_names.contains(name) && !self.value_names.contains(name) && !self.import_locals.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_classifies_bindings() {
        let program = tsdual_parser::parse_source(
            "import { a, type B } from './m';\ninterface I {}\nconst c = 1;\nexport { c as d, I };\nexport function f() {}",
            0,
        )
        .unwrap();
        let scan = ModuleScan::new(&program.items);
        assert!(scan.import_locals.contains("a"));
        assert!(scan.is_type_only("B"));
        assert!(scan.is_type_only("I"));
        assert!(!scan.is_type_only("c"));
        assert!(scan.value_names.contains("f"));
        assert_eq!(scan.local_exports.get("c"), Some(&vec!["d".to_string()]));
        assert!(!scan.local_exports.contains_key("I"));
    }
}
