//! Module system definitions for the AST

use super::*;

/// Module item (top-level in a module or namespace body)
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    /// Import declaration
    Import(ImportDecl),

    /// Export declaration
    Export(ExportDecl),

    /// `import x = require("m")` or `import x = A.B`
    ImportEquals(ImportEqualsDecl),

    /// Statement (declarations included)
    Stmt(Stmt),
}

/// Import declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub type_only: bool,
    /// `import "module";` with no import clause
    pub bare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// import name from "module"
    Default(Node<Ident>),

    /// import * as name from "module"
    Namespace(Node<Ident>),

    /// import { name } from "module" or import { name as alias } from "module"
    Named {
        imported: Node<Ident>,
        local: Option<Node<Ident>>,
        type_only: bool,
    },
}

impl ImportSpecifier {
    /// Local binding introduced by this specifier.
    pub fn local_name(&self) -> &str {
        match self {
            ImportSpecifier::Default(ident) | ImportSpecifier::Namespace(ident) => {
                &ident.value.name
            }
            ImportSpecifier::Named {
                imported, local, ..
            } => &local.as_ref().unwrap_or(imported).value.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportEqualsDecl {
    pub name: Node<Ident>,
    pub reference: ModuleReference,
    pub is_export: bool,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleReference {
    /// require("module")
    External(String),
    /// Qualified entity name: A.B.C
    Entity(Node<Expr>),
}

/// Export declaration
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// export { name }
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        type_only: bool,
    },

    /// export default expr
    Default(Node<Expr>),

    /// export default function/class/interface; `anonymous` marks a
    /// declaration whose name was synthesized by the parser
    DefaultDecl {
        decl: Box<Node<Decl>>,
        anonymous: bool,
    },

    /// export * from "module"
    All {
        source: String,
        as_name: Option<Node<Ident>>,
        type_only: bool,
    },

    /// export declaration
    Decl(Box<Node<Decl>>),

    /// export = expr
    Assignment(Node<Expr>),

    /// export as namespace Name
    AsNamespace(Node<Ident>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Node<Ident>,
    pub exported: Option<Node<Ident>>,
    pub type_only: bool,
}

impl ExportSpecifier {
    pub fn exported_name(&self) -> &str {
        &self.exported.as_ref().unwrap_or(&self.local).value.name
    }
}

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Node<ModuleItem>>,
    pub span: Span,
}

impl Program {
    /// A file is a module when it has any import or export at top level.
    pub fn is_module(&self) -> bool {
        self.items.iter().any(|item| match &item.value {
            ModuleItem::Import(_) | ModuleItem::Export(_) => true,
            ModuleItem::ImportEquals(decl) => {
                decl.is_export || matches!(decl.reference, ModuleReference::External(_))
            }
            ModuleItem::Stmt(_) => false,
        })
    }
}
