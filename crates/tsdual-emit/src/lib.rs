//! JavaScript and declaration emission for TypeScript syntax trees.
//!
//! [`lower`] rewrites a parsed program into plain JavaScript for one
//! module format: TypeScript-only syntax is erased, enums and namespaces
//! become IIFEs, and imports and exports are either kept (ES modules) or
//! turned into `require`/`exports` (CommonJS). [`print_program`] renders
//! the result; [`emit_declarations`] renders the `.d.ts` surface.

mod cjs;
mod classes;
mod dts;
mod enums;
mod esm;
mod helpers;
mod namespace;
mod options;
mod printer;
mod rename;
mod scan;
mod strip;

pub use dts::emit_declarations;
pub use enums::{evaluate_enum, EnumValue, EvaluatedMember};
pub use options::{LowerOptions, ModuleKind, ScriptTarget};
pub use printer::{print_expr, print_program, quote};

use std::fmt;

use tsdual_ast::{Program, Span};

/// Problem found while lowering, reported with a TypeScript error code.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitDiagnostic {
    pub message: String,
    pub span: Span,
    pub code: u32,
}

impl EmitDiagnostic {
    pub fn new(message: impl Into<String>, span: Span, code: u32) -> Self {
        Self {
            message: message.into(),
            span,
            code,
        }
    }
}

impl fmt::Display for EmitDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{}: {}", self.code, self.message)
    }
}

impl std::error::Error for EmitDiagnostic {}

/// A lowered program and whatever was reported while producing it.
#[derive(Debug, Clone)]
pub struct Lowered {
    pub program: Program,
    pub diagnostics: Vec<EmitDiagnostic>,
}

/// Lowers `program` to JavaScript for `options.module`.
pub fn lower(program: Program, options: &LowerOptions) -> Lowered {
    if options.module.is_es_module() {
        esm::lower_es_module(program, options)
    } else {
        cjs::lower_commonjs(program, options)
    }
}

/// Lowers and prints in one step.
pub fn emit_javascript(program: Program, options: &LowerOptions) -> (String, Vec<EmitDiagnostic>) {
    let lowered = lower(program, options);
    (print_program(&lowered.program), lowered.diagnostics)
}
