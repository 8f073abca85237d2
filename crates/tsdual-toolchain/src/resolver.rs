//! Module resolution for import specifiers.
//!
//! Relative and absolute specifiers are looked up next to the importing
//! file; bare package names walk up through `node_modules` (and
//! `node_modules/@types`) the way Node does. Only TypeScript inputs
//! (`.ts`, `.tsx`, `.d.ts`) are ever resolved.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::host::CompilerHost;
use crate::options::{normalize, CompilerOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Ts,
    Tsx,
    Dts,
}

impl Extension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Ts => ".ts",
            Extension::Tsx => ".tsx",
            Extension::Dts => ".d.ts",
        }
    }

    /// Candidates in lookup order.
    const ALL: [Extension; 3] = [Extension::Ts, Extension::Tsx, Extension::Dts];

    fn of(path: &Path) -> Option<Extension> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".d.ts") {
            Some(Extension::Dts)
        } else if name.ends_with(".ts") {
            Some(Extension::Ts)
        } else if name.ends_with(".tsx") {
            Some(Extension::Tsx)
        } else {
            None
        }
    }
}

/// A specifier resolved to a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedModule {
    pub resolved_file_name: PathBuf,
    pub extension: Extension,
    /// Found through `node_modules`
    pub is_external_library_import: bool,
}

impl ResolvedModule {
    pub fn is_declaration(&self) -> bool {
        self.extension == Extension::Dts
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    types: Option<String>,
    typings: Option<String>,
    main: Option<String>,
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolves `specifier` as imported from `containing_file`.
pub fn resolve_module_name(
    specifier: &str,
    containing_file: &Path,
    _options: &CompilerOptions,
    host: &dyn CompilerHost,
) -> Option<ResolvedModule> {
    let containing_dir = containing_file.parent()?;

    if is_relative_specifier(specifier) || Path::new(specifier).is_absolute() {
        let candidate = normalize(&containing_dir.join(specifier));
        return load_as_file(&candidate, host)
            .or_else(|| load_as_directory(&candidate, host))
            .map(|(path, extension)| ResolvedModule {
                resolved_file_name: path,
                extension,
                is_external_library_import: false,
            });
    }

    resolve_from_node_modules(specifier, containing_dir, host)
}

fn resolve_from_node_modules(
    specifier: &str,
    start: &Path,
    host: &dyn CompilerHost,
) -> Option<ResolvedModule> {
    let types_name = types_package_name(specifier);
    for dir in start.ancestors() {
        if dir.file_name().is_some_and(|name| name == "node_modules") {
            continue;
        }
        let node_modules = dir.join("node_modules");
        if !host.directory_exists(&node_modules) {
            continue;
        }
        for candidate in [node_modules.join(specifier), node_modules.join("@types").join(&types_name)] {
            if let Some((path, extension)) =
                load_as_file(&candidate, host).or_else(|| load_as_directory(&candidate, host))
            {
                return Some(ResolvedModule {
                    resolved_file_name: path,
                    extension,
                    is_external_library_import: true,
                });
            }
        }
    }
    None
}

/// `@scope/pkg/sub` is published as `@types/scope__pkg/sub`.
fn types_package_name(specifier: &str) -> String {
    match specifier.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => specifier.to_string(),
    }
}

fn load_as_file(candidate: &Path, host: &dyn CompilerHost) -> Option<(PathBuf, Extension)> {
    if let Some(extension) = Extension::of(candidate) {
        if host.file_exists(candidate) {
            return Some((candidate.to_path_buf(), extension));
        }
    }

    // `./a.js` in source refers to what will be emitted from `./a.ts`
    let text = candidate.to_str()?;
    let stem = [".js", ".jsx", ".mjs", ".cjs"]
        .iter()
        .find_map(|ext| text.strip_suffix(ext))
        .unwrap_or(text);
    for extension in Extension::ALL {
        let path = PathBuf::from(format!("{}{}", stem, extension.as_str()));
        if host.file_exists(&path) {
            return Some((path, extension));
        }
    }
    None
}

fn load_as_directory(candidate: &Path, host: &dyn CompilerHost) -> Option<(PathBuf, Extension)> {
    if !host.directory_exists(candidate) {
        return None;
    }

    let manifest = candidate.join("package.json");
    if let Some(package) = host
        .read_file(&manifest)
        .and_then(|text| serde_json::from_str::<PackageJson>(&text).ok())
    {
        for entry in [package.types, package.typings, package.main].into_iter().flatten() {
            let target = normalize(&candidate.join(entry));
            if let Some(found) = load_as_file(&target, host) {
                return Some(found);
            }
            if target.as_path() != candidate {
                if let Some(found) = load_index(&target, host) {
                    return Some(found);
                }
            }
        }
    }

    load_index(candidate, host)
}

fn load_index(dir: &Path, host: &dyn CompilerHost) -> Option<(PathBuf, Extension)> {
    Extension::ALL.into_iter().find_map(|extension| {
        let path = dir.join(format!("index{}", extension.as_str()));
        host.file_exists(&path).then_some((path, extension))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SystemHost;
    use std::fs;

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn resolve(specifier: &str, from: &Path) -> Option<ResolvedModule> {
        resolve_module_name(specifier, from, &CompilerOptions::default(), &SystemHost::new())
    }

    #[test]
    fn test_relative_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/a/b.ts"), "");
        touch(&root.join("src/view.tsx"), "");
        touch(&root.join("src/types.d.ts"), "");
        let from = root.join("src/index.ts");

        let b = resolve("./a/b", &from).unwrap();
        assert_eq!(b.resolved_file_name, root.join("src/a/b.ts"));
        assert!(!b.is_declaration());

        assert_eq!(resolve("./a/b.ts", &from).unwrap().resolved_file_name, root.join("src/a/b.ts"));
        assert_eq!(resolve("./a/b.js", &from).unwrap().resolved_file_name, root.join("src/a/b.ts"));
        assert_eq!(resolve("./view", &from).unwrap().extension, Extension::Tsx);
        assert!(resolve("./types", &from).unwrap().is_declaration());
        assert_eq!(resolve("./missing", &from), None);
    }

    #[test]
    fn test_directory_index_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/util/index.ts"), "");
        let from = root.join("src/deep/file.ts");

        let util = resolve("../util", &from).unwrap();
        assert_eq!(util.resolved_file_name, root.join("src/util/index.ts"));
    }

    #[test]
    fn test_node_modules_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(
            &root.join("node_modules/lib/package.json"),
            r#"{ "name": "lib", "types": "dist/lib.d.ts" }"#,
        );
        touch(&root.join("node_modules/lib/dist/lib.d.ts"), "");
        touch(&root.join("node_modules/@types/scope__pkg/index.d.ts"), "");
        let from = root.join("packages/a/src/index.ts");

        let lib = resolve("lib", &from).unwrap();
        assert_eq!(lib.resolved_file_name, root.join("node_modules/lib/dist/lib.d.ts"));
        assert!(lib.is_external_library_import);

        let scoped = resolve("@scope/pkg", &from).unwrap();
        assert_eq!(
            scoped.resolved_file_name,
            root.join("node_modules/@types/scope__pkg/index.d.ts")
        );
        assert_eq!(resolve("nope", &from), None);
    }

    #[test]
    fn test_relative_specifier_detection() {
        assert!(is_relative_specifier("./a"));
        assert!(is_relative_specifier("../a"));
        assert!(is_relative_specifier(".."));
        assert!(!is_relative_specifier("a"));
        assert!(!is_relative_specifier(".hidden"));
        assert!(!is_relative_specifier("@scope/a"));
    }
}
