//! Hooks into program emission.

use std::fmt;
use std::path::Path;

use tsdual_ast::Program as Ast;

use crate::host::CompilerHost;
use crate::options::CompilerOptions;
use crate::resolver::{resolve_module_name, ResolvedModule};

/// What a transformer knows about the file it is rewriting.
pub struct TransformContext<'a> {
    pub file_name: &'a Path,
    pub options: &'a CompilerOptions,
    pub host: &'a dyn CompilerHost,
}

impl TransformContext<'_> {
    /// Resolves an import specifier from the current file with the current
    /// compilation's options.
    pub fn resolve(&self, specifier: &str) -> Option<ResolvedModule> {
        resolve_module_name(specifier, self.file_name, self.options, self.host)
    }
}

/// A syntax tree rewrite run during emit.
///
/// `before` transformers see the TypeScript tree; `after` transformers see
/// the tree lowered to the target module format.
pub trait Transformer {
    fn name(&self) -> &'static str;

    fn transform(&self, program: &mut Ast, context: &TransformContext<'_>);
}

#[derive(Default)]
pub struct CustomTransformers {
    pub before: Vec<Box<dyn Transformer>>,
    pub after: Vec<Box<dyn Transformer>>,
}

impl CustomTransformers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, transformer: impl Transformer + 'static) -> Self {
        self.before.push(Box::new(transformer));
        self
    }

    pub fn after(mut self, transformer: impl Transformer + 'static) -> Self {
        self.after.push(Box::new(transformer));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

impl fmt::Debug for CustomTransformers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |list: &[Box<dyn Transformer>]| list.iter().map(|t| t.name()).collect::<Vec<_>>();
        f.debug_struct("CustomTransformers")
            .field("before", &names(&self.before))
            .field("after", &names(&self.after))
            .finish()
    }
}

/// Polled between files by long-running program operations.
pub trait CancellationToken {
    fn is_cancellation_requested(&self) -> bool;
}

/// A token that never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancellation_requested(&self) -> bool {
        false
    }
}
