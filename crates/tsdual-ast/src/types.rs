//! Type annotation definitions for the AST

/// A type annotation, type argument list, or type parameter list, kept as
/// the exact source text it was parsed from.
///
/// Emitting JavaScript drops these entirely; the declaration emitter prints
/// `text` back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TsType {
    pub text: String,
}

impl TsType {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn keyword(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for TsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
