//! Runtime helpers injected into CommonJS output.

use std::collections::BTreeSet;

use tsdual_ast::{ModuleItem, Node, Stmt};

/// Ordered the way they are emitted; later helpers call earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Helper {
    CreateBinding,
    SetModuleDefault,
    ImportStar,
    ExportStar,
    ImportDefault,
}

impl Helper {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Helper::CreateBinding => "__createBinding",
            Helper::SetModuleDefault => "__setModuleDefault",
            Helper::ImportStar => "__importStar",
            Helper::ExportStar => "__exportStar",
            Helper::ImportDefault => "__importDefault",
        }
    }

    fn dependencies(self) -> &'static [Helper] {
        match self {
            Helper::ImportStar => &[Helper::CreateBinding, Helper::SetModuleDefault],
            Helper::ExportStar => &[Helper::CreateBinding],
            _ => &[],
        }
    }

    fn source(self) -> &'static str {
        match self {
            Helper::CreateBinding => CREATE_BINDING,
            Helper::SetModuleDefault => SET_MODULE_DEFAULT,
            Helper::ImportStar => IMPORT_STAR,
            Helper::ExportStar => EXPORT_STAR,
            Helper::ImportDefault => IMPORT_DEFAULT,
        }
    }
}

const CREATE_BINDING: &str = r#"var __createBinding = (this && this.__createBinding) || (Object.create ? (function (o, m, k, k2) {
    if (k2 === undefined) k2 = k;
    var desc = Object.getOwnPropertyDescriptor(m, k);
    if (!desc || ("get" in desc ? !m.__esModule : desc.writable || desc.configurable)) {
        desc = { enumerable: true, get: function () { return m[k]; } };
    }
    Object.defineProperty(o, k2, desc);
}) : (function (o, m, k, k2) {
    if (k2 === undefined) k2 = k;
    o[k2] = m[k];
}));"#;

const SET_MODULE_DEFAULT: &str = r#"var __setModuleDefault = (this && this.__setModuleDefault) || (Object.create ? (function (o, v) {
    Object.defineProperty(o, "default", { enumerable: true, value: v });
}) : function (o, v) {
    o["default"] = v;
});"#;

const IMPORT_STAR: &str = r#"var __importStar = (this && this.__importStar) || function (mod) {
    if (mod && mod.__esModule) return mod;
    var result = {};
    if (mod != null) for (var k in mod) if (k !== "default" && Object.prototype.hasOwnProperty.call(mod, k)) __createBinding(result, mod, k);
    __setModuleDefault(result, mod);
    return result;
};"#;

const EXPORT_STAR: &str = r#"var __exportStar = (this && this.__exportStar) || function (m, exports) {
    for (var p in m) if (p !== "default" && !Object.prototype.hasOwnProperty.call(exports, p)) __createBinding(exports, m, p);
};"#;

const IMPORT_DEFAULT: &str = r#"var __importDefault = (this && this.__importDefault) || function (mod) {
    return (mod && mod.__esModule) ? mod : { "default": mod };
};"#;

/// Set of helpers a file needs, closed over dependencies.
#[derive(Debug, Default)]
pub(crate) struct HelperSet(BTreeSet<Helper>);

impl HelperSet {
    pub(crate) fn require(&mut self, helper: Helper) {
        for dependency in helper.dependencies() {
            self.0.insert(*dependency);
        }
        self.0.insert(helper);
    }

    /// Declarations for every required helper, in dependency order.
    pub(crate) fn statements(&self) -> Vec<Node<Stmt>> {
        self.0
            .iter()
            .flat_map(|helper| parse_helper(helper.source()))
            .collect()
    }
}

fn parse_helper(source: &str) -> Vec<Node<Stmt>> {
    let program = tsdual_parser::parse_source(source, 0).unwrap_or_else(|_| tsdual_ast::Program {
        items: Vec::new(),
        span: Default::default(),
    });
    program
        .items
        .into_iter()
        .filter_map(|item| match item.value {
            ModuleItem::Stmt(stmt) => Some(Node::synthetic(stmt)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_helper_parses() {
        for helper in [
            Helper::CreateBinding,
            Helper::SetModuleDefault,
            Helper::ImportStar,
            Helper::ExportStar,
            Helper::ImportDefault,
        ] {
            assert!(
                tsdual_parser::parse_source(helper.source(), 0).is_ok(),
                "{} failed to parse",
                helper.name()
            );
        }
    }

    #[test]
    fn test_dependencies_are_included_in_order() {
        let mut helpers = HelperSet::default();
        helpers.require(Helper::ImportStar);
        let stmts = helpers.statements();
        assert_eq!(stmts.len(), 3);
        let names: Vec<String> = stmts
            .iter()
            .flat_map(|stmt| match &stmt.value {
                Stmt::Decl(decl) => decl.declared_names(),
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(names, vec!["__createBinding", "__setModuleDefault", "__importStar"]);
    }
}
