//! Rewrites relative import specifiers in ES module output to the `.mjs`
//! files they will resolve to at runtime.
//!
//! Node's ESM loader performs no extension or directory-index lookup, so
//! `import "./util"` has to name `./util.mjs`, and `import "./lib"` that
//! resolved to `lib/index.ts` has to name `./lib/index.mjs`.

use std::path::{Component, Path};

use tracing::debug;
use tsdual_ast::visit::{walk_expr, VisitMut};
use tsdual_ast::{ExportDecl, Expr, Literal, ModuleItem, Node, Program};
use tsdual_toolchain::{is_relative_specifier, ResolvedModule, TransformContext, Transformer};

/// Rewrites every relative specifier in `program` that `resolve` can find.
///
/// Specifiers that do not resolve, or that resolve to a declaration file,
/// are left as written.
pub fn resolve_module_paths<F>(program: &mut Program, containing_file: &Path, resolve: F)
where
    F: Fn(&str) -> Option<ResolvedModule>,
{
    let containing_dir = containing_file.parent().unwrap_or_else(|| Path::new(""));
    let mut rewriter = SpecifierRewriter {
        containing_dir,
        resolve,
    };

    for item in &mut program.items {
        match &mut item.value {
            ModuleItem::Import(import) => rewriter.rewrite(&mut import.source),
            ModuleItem::Export(ExportDecl::Named {
                source: Some(source), ..
            })
            | ModuleItem::Export(ExportDecl::All { source, .. }) => rewriter.rewrite(source),
            _ => {}
        }
    }
    rewriter.visit_program(program);
}

struct SpecifierRewriter<'a, F> {
    containing_dir: &'a Path,
    resolve: F,
}

impl<F> SpecifierRewriter<'_, F>
where
    F: Fn(&str) -> Option<ResolvedModule>,
{
    fn rewrite(&self, specifier: &mut String) {
        if !is_relative_specifier(specifier) {
            return;
        }
        let Some(resolved) = (self.resolve)(specifier) else {
            return;
        };
        if resolved.is_declaration() {
            return;
        }

        let mut path = relative_path(self.containing_dir, &resolved.resolved_file_name);
        if !path.starts_with("./") && !path.starts_with("../") {
            path.insert_str(0, "./");
        }
        let rewritten = replace_ts_extension(&path);
        debug!(from = %specifier, to = %rewritten, "rewrote module specifier");
        *specifier = rewritten;
    }
}

impl<F> VisitMut for SpecifierRewriter<'_, F>
where
    F: Fn(&str) -> Option<ResolvedModule>,
{
    fn visit_expr(&mut self, expr: &mut Node<Expr>) {
        if let Expr::DynamicImport(argument) = &mut expr.value {
            if let Expr::Literal(Literal::String(specifier)) = &mut argument.value {
                self.rewrite(specifier);
            }
        }
        walk_expr(self, expr);
    }
}

fn replace_ts_extension(path: &str) -> String {
    for extension in [".tsx", ".ts"] {
        if let Some(stem) = path.strip_suffix(extension) {
            return format!("{stem}.mjs");
        }
    }
    path.to_string()
}

/// `to` relative to the directory `from`, with `/` separators.
fn relative_path(from: &Path, to: &Path) -> String {
    let from: Vec<Component<'_>> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to: Vec<Component<'_>> = to.components().filter(|c| *c != Component::CurDir).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat("..".to_string()).take(from.len() - common));
    parts.extend(to[common..].iter().map(|c| c.as_os_str().to_string_lossy().into_owned()));
    parts.join("/")
}

/// [`resolve_module_paths`] as an after-emit transformer for ES module
/// output, resolving with the compilation's own options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveModulePaths;

impl Transformer for ResolveModulePaths {
    fn name(&self) -> &'static str {
        "resolve-module-paths"
    }

    fn transform(&self, program: &mut Program, context: &TransformContext<'_>) {
        resolve_module_paths(program, context.file_name, |specifier| context.resolve(specifier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use tsdual_emit::print_program;
    use tsdual_toolchain::{CompilerOptions, SystemHost};

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
    }

    impl Fixture {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_path_buf();
            for (name, contents) in files {
                let path = root.join(name);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, contents).unwrap();
            }
            Fixture { _dir: dir, root }
        }

        fn rewrite(&self, file: &str, source: &str) -> String {
            let mut program = tsdual_parser::parse_source(source, 0).unwrap();
            let host = SystemHost::with_current_directory(self.root.clone());
            let options = CompilerOptions::default();
            let file_name = self.root.join(file);
            let context = TransformContext {
                file_name: &file_name,
                options: &options,
                host: &host,
            };
            ResolveModulePaths.transform(&mut program, &context);
            print_program(&program)
        }
    }

    #[test]
    fn test_relative_imports_get_mjs_paths() {
        let fixture = Fixture::new(&[
            ("src/index.ts", ""),
            ("src/util.ts", ""),
            ("src/view.tsx", ""),
            ("src/lib/index.ts", ""),
            ("shared/log.ts", ""),
        ]);
        let output = fixture.rewrite(
            "src/index.ts",
            "import { a } from \"./util\";\nimport View from \"./view\";\nimport * as lib from \"./lib\";\nimport { log } from \"../shared/log\";\nimport \"./util.js\";\n",
        );
        assert_eq!(
            output,
            "import { a } from \"./util.mjs\";\nimport View from \"./view.mjs\";\nimport * as lib from \"./lib/index.mjs\";\nimport { log } from \"../shared/log.mjs\";\nimport \"./util.mjs\";\n"
        );
    }

    #[test]
    fn test_reexports_and_dynamic_imports() {
        let fixture = Fixture::new(&[("index.ts", ""), ("a.ts", ""), ("b.ts", ""), ("c.ts", "")]);
        let output = fixture.rewrite(
            "index.ts",
            "export { x } from \"./a\";\nexport * from \"./b\";\nexport const load = () => import(\"./c\");\n",
        );
        assert!(output.contains("export { x } from \"./a.mjs\";"), "{}", output);
        assert!(output.contains("export * from \"./b.mjs\";"), "{}", output);
        assert!(output.contains("import(\"./c.mjs\")"), "{}", output);
    }

    #[test]
    fn test_unresolved_bare_and_declaration_specifiers_are_kept() {
        let fixture = Fixture::new(&[("index.ts", ""), ("types.d.ts", "")]);
        let source = "import fs from \"fs\";\nimport { T } from \"./types\";\nimport { m } from \"./missing\";\nconst name = \"./x\";\nimport(name);\n";
        let output = fixture.rewrite("index.ts", source);
        assert_eq!(output, print_program(&tsdual_parser::parse_source(source, 0).unwrap()));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(Path::new("/p/src"), Path::new("/p/src/a.ts")), "a.ts");
        assert_eq!(relative_path(Path::new("/p/src/deep"), Path::new("/p/lib/b.ts")), "../../lib/b.ts");
        assert_eq!(replace_ts_extension("./a.tsx"), "./a.mjs");
        assert_eq!(replace_ts_extension("./a.json"), "./a.json");
    }
}
