//! Compiler diagnostics and their terminal rendering.

use std::fmt;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use tsdual_ast::Span;

/// Contents of a source file a diagnostic points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub path: PathBuf,
    pub text: String,
}

impl SourceText {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Zero-based line and column of a byte offset.
    pub fn line_and_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let before = self.text.get(..offset).unwrap_or(&self.text);
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        let column = before[line_start..].chars().count();
        (line, column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Message => "message",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: Option<Arc<SourceText>>,
    pub start: usize,
    pub length: usize,
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: String,
}

impl Diagnostic {
    /// An error at `span` in `file`.
    pub fn error_at(file: &Arc<SourceText>, span: Span, code: u32, message: impl Into<String>) -> Self {
        Self {
            file: Some(Arc::clone(file)),
            start: span.start,
            length: span.end.saturating_sub(span.start),
            code,
            category: DiagnosticCategory::Error,
            message: message.into(),
        }
    }

    /// An error not tied to a location, such as a configuration problem.
    pub fn global(code: u32, message: impl Into<String>) -> Self {
        Self {
            file: None,
            start: 0,
            length: 0,
            code,
            category: DiagnosticCategory::Error,
            message: message.into(),
        }
    }
}

/// Whether diagnostics should be rendered with color and source context.
pub fn stderr_is_pretty() -> bool {
    std::io::stderr().is_terminal()
}

/// Renders diagnostics the way `tsc` does: one
/// `file(line,col): error TSnnnn: message` line each, or source-annotated
/// reports when `pretty` is set.
pub fn format_diagnostics(diagnostics: &[Diagnostic], pretty: bool) -> String {
    let current_dir = std::env::current_dir().unwrap_or_default();
    let mut out = String::new();
    for diagnostic in diagnostics {
        if pretty {
            out.push_str(&format_pretty(diagnostic, &current_dir));
        } else {
            out.push_str(&format_plain(diagnostic, &current_dir));
            out.push('\n');
        }
    }
    out
}

fn format_plain(diagnostic: &Diagnostic, current_dir: &Path) -> String {
    let mut text = String::new();
    if let Some(file) = &diagnostic.file {
        let (line, column) = file.line_and_column(diagnostic.start);
        text.push_str(&format!(
            "{}({},{}): ",
            display_path(&file.path, current_dir),
            line + 1,
            column + 1
        ));
    }
    text.push_str(&format!(
        "{} TS{}: {}",
        diagnostic.category, diagnostic.code, diagnostic.message
    ));
    text
}

fn format_pretty(diagnostic: &Diagnostic, current_dir: &Path) -> String {
    let Some(file) = &diagnostic.file else {
        return format!("{}\n", format_plain(diagnostic, current_dir));
    };
    let name = display_path(&file.path, current_dir);
    let end = (diagnostic.start + diagnostic.length.max(1)).min(file.text.len());
    let start = diagnostic.start.min(end);
    let kind = match diagnostic.category {
        DiagnosticCategory::Error => ReportKind::Error,
        DiagnosticCategory::Warning => ReportKind::Warning,
        DiagnosticCategory::Message => ReportKind::Advice,
    };

    let mut rendered = Vec::new();
    let written = Report::build(kind, (name.as_str(), start..end))
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_code(format!("TS{}", diagnostic.code))
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((name.as_str(), start..end))
                .with_message(&diagnostic.message)
                .with_color(Color::Red),
        )
        .finish()
        .write((name.as_str(), Source::from(file.text.as_str())), &mut rendered);
    match written {
        Ok(()) => String::from_utf8_lossy(&rendered).into_owned(),
        Err(_) => format!("{}\n", format_plain(diagnostic, current_dir)),
    }
}

fn display_path(path: &Path, current_dir: &Path) -> String {
    path.strip_prefix(current_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        let file = Arc::new(SourceText::new("/nowhere/src/a.ts", "const a = 1;\nlet = ;\n"));
        Diagnostic::error_at(&file, Span::new(17, 18, 0), 1005, "'=' expected.")
    }

    #[test]
    fn test_line_and_column() {
        let file = SourceText::new("a.ts", "ab\ncd\nef");
        assert_eq!(file.line_and_column(0), (0, 0));
        assert_eq!(file.line_and_column(4), (1, 1));
        assert_eq!(file.line_and_column(100), (2, 2));
    }

    #[test]
    fn test_plain_format() {
        assert_eq!(
            format_diagnostics(&[sample()], false),
            "/nowhere/src/a.ts(2,5): error TS1005: '=' expected.\n"
        );
    }

    #[test]
    fn test_global_diagnostic() {
        let diagnostic = Diagnostic::global(18003, "No inputs were found in config file.");
        assert_eq!(
            format_diagnostics(&[diagnostic], false),
            "error TS18003: No inputs were found in config file.\n"
        );
    }

    #[test]
    fn test_pretty_format_names_code() {
        let rendered = format_diagnostics(&[sample()], true);
        assert!(rendered.contains("TS1005"), "{}", rendered);
        assert!(rendered.contains("'=' expected."), "{}", rendered);
    }
}
