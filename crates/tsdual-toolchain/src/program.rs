//! A set of parsed source files compiled with one set of options.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use tsdual_ast::{ExportDecl, ModuleItem, ModuleReference, Program as Ast, Span};
use tsdual_emit::{emit_declarations, lower, print_program};

use crate::buildinfo::{build_info_path, hash_file, hash_text, options_hash, BuildInfo, BUILD_INFO_VERSION};
use crate::config::{is_declaration_file, parse_config, ProjectReference};
use crate::diagnostics::{Diagnostic, SourceText};
use crate::emit_hook::{declaration_output_file_path, own_emit_output_file_path};
use crate::host::CompilerHost;
use crate::options::{normalize, CompilerOptions};
use crate::resolver::{is_relative_specifier, resolve_module_name, ResolvedModule};
use crate::transform::{CancellationToken, CustomTransformers, TransformContext};

pub struct CreateProgramOptions {
    pub options: CompilerOptions,
    pub root_names: Vec<PathBuf>,
    pub host: Arc<dyn CompilerHost>,
    pub project_references: Vec<ProjectReference>,
}

/// An import specifier found in a file, with what it resolved to.
#[derive(Debug, Clone)]
pub struct ModuleImport {
    pub specifier: String,
    pub span: Span,
    pub resolved: Option<ResolvedModule>,
}

#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: Arc<SourceText>,
    ast: Option<Ast>,
    parse_diagnostics: Vec<Diagnostic>,
    pub imports: Vec<ModuleImport>,
}

impl SourceFile {
    pub fn is_declaration_file(&self) -> bool {
        is_declaration_file(&self.path)
    }

    pub fn ast(&self) -> Option<&Ast> {
        self.ast.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct EmitResult {
    pub diagnostics: Vec<Diagnostic>,
    pub emit_skipped: bool,
    pub emitted_files: Vec<PathBuf>,
}

pub struct Program {
    options: CompilerOptions,
    host: Arc<dyn CompilerHost>,
    files: Vec<SourceFile>,
    root_names: Vec<PathBuf>,
    file_diagnostics: Vec<Diagnostic>,
    project_references: Vec<ProjectReference>,
}

impl Program {
    /// Reads and parses the root files and, unless `noResolve` is set, every
    /// local file they import.
    pub fn create(create: CreateProgramOptions) -> Program {
        let CreateProgramOptions {
            options,
            root_names,
            host,
            project_references,
        } = create;
        let current_dir = host.current_directory();
        let root_names: Vec<PathBuf> = root_names
            .iter()
            .map(|name| normalize(&current_dir.join(name)))
            .collect();

        let mut files = Vec::new();
        let mut file_diagnostics = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<PathBuf> = root_names.iter().cloned().collect();
        let follow_imports = !options.no_resolve.unwrap_or(false);

        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(text) = host.read_file(&path) else {
                file_diagnostics.push(Diagnostic::global(6053, format!("File '{}' not found.", path.display())));
                continue;
            };
            let file = parse_file(path, text, files.len(), &options, host.as_ref(), follow_imports);
            if follow_imports {
                queue.extend(
                    file.imports
                        .iter()
                        .filter_map(|import| import.resolved.as_ref())
                        .filter(|resolved| !resolved.is_external_library_import)
                        .map(|resolved| resolved.resolved_file_name.clone()),
                );
            }
            files.push(file);
        }

        debug!(files = files.len(), roots = root_names.len(), "created program");
        Program {
            options,
            host,
            files,
            root_names,
            file_diagnostics,
            project_references,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn source_file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.path == path)
    }

    pub fn root_file_names(&self) -> &[PathBuf] {
        &self.root_names
    }

    pub fn project_references(&self) -> &[ProjectReference] {
        &self.project_references
    }

    /// Syntax errors, unresolved relative imports, and everything the
    /// JavaScript lowering refuses.
    pub fn pre_emit_diagnostics(&self, token: &dyn CancellationToken) -> Vec<Diagnostic> {
        let mut diagnostics = self.file_diagnostics.clone();
        let check_imports = !self.options.no_resolve.unwrap_or(false);
        let lower_options = self.options.lower_options();

        for file in &self.files {
            if token.is_cancellation_requested() {
                break;
            }
            diagnostics.extend(file.parse_diagnostics.iter().cloned());

            if check_imports {
                for import in &file.imports {
                    if import.resolved.is_none() && is_relative_specifier(&import.specifier) {
                        diagnostics.push(Diagnostic::error_at(
                            &file.text,
                            import.span,
                            2307,
                            format!(
                                "Cannot find module '{}' or its corresponding type declarations.",
                                import.specifier
                            ),
                        ));
                    }
                }
            }

            if let (Some(ast), false) = (&file.ast, file.is_declaration_file()) {
                let lowered = lower(ast.clone(), &lower_options);
                diagnostics.extend(
                    lowered
                        .diagnostics
                        .into_iter()
                        .map(|d| Diagnostic::error_at(&file.text, d.span, d.code, d.message)),
                );
            }
        }
        diagnostics
    }

    /// Directory that output paths are made relative to: `rootDir`, the
    /// config directory for composite projects, or the deepest directory
    /// containing every emitted source.
    pub fn common_source_directory(&self) -> PathBuf {
        common_source_directory(
            &self.options,
            self.files.iter().map(|file| file.path.as_path()),
            &self.host.current_directory(),
        )
    }

    /// Writes JavaScript (and declarations when enabled) for every source
    /// file, running `transformers` around the lowering step.
    pub fn emit(&self, transformers: Option<&CustomTransformers>, token: &dyn CancellationToken) -> EmitResult {
        let mut result = EmitResult::default();
        if self.options.no_emit.unwrap_or(false) {
            result.emit_skipped = true;
            return result;
        }

        let lower_options = self.options.lower_options();
        let common_dir = self.common_source_directory();
        let write_declarations = self.options.declaration.unwrap_or(false);

        for file in &self.files {
            if token.is_cancellation_requested() {
                result.emit_skipped = true;
                return result;
            }
            let Some(ast) = &file.ast else {
                continue;
            };
            if file.is_declaration_file() {
                continue;
            }

            let context = TransformContext {
                file_name: &file.path,
                options: &self.options,
                host: self.host.as_ref(),
            };
            let mut source = ast.clone();
            for transformer in transformers.iter().flat_map(|t| &t.before) {
                transformer.transform(&mut source, &context);
            }
            let mut lowered = lower(source, &lower_options);
            result.diagnostics.extend(
                lowered
                    .diagnostics
                    .drain(..)
                    .map(|d| Diagnostic::error_at(&file.text, d.span, d.code, d.message)),
            );
            for transformer in transformers.iter().flat_map(|t| &t.after) {
                transformer.transform(&mut lowered.program, &context);
            }

            let output = own_emit_output_file_path(&file.path, &self.options, &common_dir);
            self.write(&output, &print_program(&lowered.program), &mut result);

            if write_declarations {
                let output = declaration_output_file_path(&file.path, &self.options, &common_dir);
                self.write(&output, &emit_declarations(ast), &mut result);
            }
        }

        if self.options.is_incremental() && result.diagnostics.is_empty() {
            self.write_build_info(&result);
        }
        result
    }

    fn write(&self, path: &Path, text: &str, result: &mut EmitResult) {
        match self.host.write_file(path, text) {
            Ok(()) => result.emitted_files.push(path.to_path_buf()),
            Err(error) => result.diagnostics.push(Diagnostic::global(
                5033,
                format!("Could not write file '{}': {}.", path.display(), error),
            )),
        }
    }

    fn write_build_info(&self, result: &EmitResult) {
        let Some(path) = build_info_path(&self.options) else {
            return;
        };
        let references = self
            .project_references
            .iter()
            .filter_map(|reference| parse_config(&reference.path, &CompilerOptions::default()).ok())
            .filter_map(|config| build_info_path(&config.options))
            .filter_map(|path| hash_file(&path).map(|hash| (path.to_string_lossy().into_owned(), hash)))
            .collect();
        let info = BuildInfo {
            version: BUILD_INFO_VERSION.to_string(),
            options_hash: options_hash(&self.options),
            files: self
                .files
                .iter()
                .map(|file| (file.path.to_string_lossy().into_owned(), hash_text(&file.text.text)))
                .collect::<BTreeMap<_, _>>(),
            outputs: result
                .emitted_files
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
            references,
        };
        if let Err(error) = info.write(&path, self.host.as_ref()) {
            debug!(path = %path.display(), %error, "could not write build info");
        }
    }
}

fn parse_file(
    path: PathBuf,
    text: String,
    file_id: usize,
    options: &CompilerOptions,
    host: &dyn CompilerHost,
    resolve: bool,
) -> SourceFile {
    let text = Arc::new(SourceText::new(path.clone(), text));
    let (ast, parse_diagnostics) = match tsdual_parser::parse_source(&text.text, file_id) {
        Ok(ast) => (Some(ast), Vec::new()),
        Err(errors) => {
            let diagnostics = errors
                .into_iter()
                .map(|error| Diagnostic::error_at(&text, error.span, error.code, error.message))
                .collect();
            (None, diagnostics)
        }
    };

    let imports = ast
        .as_ref()
        .map(|ast| module_specifiers(ast))
        .unwrap_or_default()
        .into_iter()
        .map(|(specifier, span)| {
            let resolved = if resolve {
                resolve_module_name(&specifier, &path, options, host)
            } else {
                None
            };
            ModuleImport {
                specifier,
                span,
                resolved,
            }
        })
        .collect();

    SourceFile {
        path,
        text,
        ast,
        parse_diagnostics,
        imports,
    }
}

/// Static module specifiers at the top level of a file.
fn module_specifiers(ast: &Ast) -> Vec<(String, Span)> {
    ast.items
        .iter()
        .filter_map(|item| {
            let source = match &item.value {
                ModuleItem::Import(import) => Some(&import.source),
                ModuleItem::Export(ExportDecl::Named { source, .. }) => source.as_ref(),
                ModuleItem::Export(ExportDecl::All { source, .. }) => Some(source),
                ModuleItem::ImportEquals(decl) => match &decl.reference {
                    ModuleReference::External(source) => Some(source),
                    ModuleReference::Entity(_) => None,
                },
                _ => None,
            };
            source.map(|source| (source.clone(), item.span))
        })
        .collect()
}

/// See [`Program::common_source_directory`]; declaration files never count.
pub fn common_source_directory<'a>(
    options: &CompilerOptions,
    files: impl IntoIterator<Item = &'a Path>,
    fallback: &Path,
) -> PathBuf {
    if let Some(root_dir) = &options.root_dir {
        return root_dir.clone();
    }
    if options.composite.unwrap_or(false) {
        if let Some(dir) = options.config_file_path.as_deref().and_then(Path::parent) {
            return dir.to_path_buf();
        }
    }
    let mut common: Option<PathBuf> = None;
    for file in files.into_iter().filter(|file| !is_declaration_file(file)) {
        let dir = file.parent().unwrap_or(Path::new("/"));
        common = Some(match common {
            None => dir.to_path_buf(),
            Some(current) => common_prefix(&current, dir),
        });
    }
    common.unwrap_or_else(|| fallback.to_path_buf())
}

fn common_prefix(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.as_os_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit_hook::tests::HOOK_LOCK;
    use crate::host::SystemHost;
    use crate::transform::{NeverCancelled, Transformer};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::PoisonError;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn program(root: &Path, files: &[&str], options: CompilerOptions) -> Program {
        Program::create(CreateProgramOptions {
            options,
            root_names: files.iter().map(|f| root.join(f)).collect(),
            host: Arc::new(SystemHost::with_current_directory(root)),
            project_references: Vec::new(),
        })
    }

    #[test]
    fn test_follows_local_imports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("src/index.ts"), "import { a } from './a';\nexport const b = a;\n");
        write(&root.join("src/a.ts"), "export const a = 1;\n");

        let program = program(root, &["src/index.ts"], CompilerOptions::default());
        let names: Vec<_> = program.source_files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(names, vec![root.join("src/index.ts"), root.join("src/a.ts")]);
        assert!(program.pre_emit_diagnostics(&NeverCancelled).is_empty());
    }

    #[test]
    fn test_pre_emit_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("broken.ts"), "let = ;\n");
        write(&root.join("imports.ts"), "import { x } from './missing';\nimport fs from 'fs';\nexport { x, fs };\n");

        let program = program(root, &["broken.ts", "imports.ts", "gone.ts"], CompilerOptions::default());
        let codes: Vec<u32> = program
            .pre_emit_diagnostics(&NeverCancelled)
            .iter()
            .map(|d| d.code)
            .collect();
        assert!(codes.contains(&6053), "{codes:?}");
        assert!(codes.contains(&2307), "{codes:?}");
        assert_eq!(codes.iter().filter(|c| **c == 2307).count(), 1);
        assert!(codes.len() >= 3);
    }

    #[test]
    fn test_no_resolve_skips_import_checks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.ts"), "export * from './missing';\n");
        let options = CompilerOptions {
            no_resolve: Some(true),
            ..CompilerOptions::default()
        };
        assert!(program(root, &["a.ts"], options).pre_emit_diagnostics(&NeverCancelled).is_empty());
    }

    #[test]
    fn test_emit_writes_javascript_and_declarations() {
        let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("src/math/add.ts"), "export function add(a: number, b: number): number { return a + b; }\n");
        write(&root.join("src/types.d.ts"), "declare const VERSION: string;\n");
        let options = CompilerOptions {
            out_dir: Some(root.join("lib")),
            declaration: Some(true),
            target: Some(tsdual_emit::ScriptTarget::Es2020),
            module: Some(tsdual_emit::ModuleKind::CommonJs),
            ..CompilerOptions::default()
        };

        let program = program(root, &["src/math/add.ts", "src/types.d.ts"], options);
        let result = program.emit(None, &NeverCancelled);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(
            result.emitted_files,
            vec![root.join("lib/add.js"), root.join("lib/add.d.ts")]
        );
        let js = fs::read_to_string(root.join("lib/add.js")).unwrap();
        assert!(js.contains("exports.add = add;"), "{js}");
        let dts = fs::read_to_string(root.join("lib/add.d.ts")).unwrap();
        assert_eq!(dts, "export declare function add(a: number, b: number): number;\n");
    }

    struct Rename;

    impl Transformer for Rename {
        fn name(&self) -> &'static str {
            "rename"
        }

        fn transform(&self, program: &mut Ast, _context: &TransformContext<'_>) {
            program.items.insert(
                0,
                tsdual_ast::factory::item(tsdual_ast::factory::expr_stmt(tsdual_ast::factory::string("transformed"))),
            );
        }
    }

    #[test]
    fn test_emit_runs_after_transformers() {
        let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.ts"), "export default 1;\n");
        let options = CompilerOptions {
            module: Some(tsdual_emit::ModuleKind::EsNext),
            out_dir: Some(root.join("es")),
            ..CompilerOptions::default()
        };

        let transformers = CustomTransformers::new().after(Rename);
        let result = program(root, &["a.ts"], options).emit(Some(&transformers), &NeverCancelled);
        assert!(result.diagnostics.is_empty());
        assert_eq!(
            fs::read_to_string(root.join("es/a.js")).unwrap(),
            "\"transformed\";\nexport default 1;\n"
        );
    }

    #[test]
    fn test_incremental_emit_writes_build_info() {
        let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.ts"), "export const a = 1;\n");
        let options = CompilerOptions {
            out_dir: Some(root.join("lib")),
            incremental: Some(true),
            config_file_path: Some(root.join("tsconfig.json")),
            ..CompilerOptions::default()
        };

        let program = program(root, &["a.ts"], options);
        program.emit(None, &NeverCancelled);
        let info = BuildInfo::read(&root.join("lib/tsconfig.tsbuildinfo")).unwrap().unwrap();
        assert_eq!(info.files.len(), 1);
        assert_eq!(info.outputs, vec![root.join("lib/a.js").to_string_lossy().into_owned()]);
    }

    #[test]
    fn test_no_emit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.ts"), "export const a = 1;\n");
        let options = CompilerOptions {
            no_emit: Some(true),
            ..CompilerOptions::default()
        };
        let result = program(root, &["a.ts"], options).emit(None, &NeverCancelled);
        assert!(result.emit_skipped);
        assert!(!root.join("a.js").exists());
    }
}
