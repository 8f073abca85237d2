//! `tsconfig.json` loading.
//!
//! Configuration files are JSON with comments and trailing commas, so they
//! are read with `json5`. `extends` chains are followed before the file's
//! own settings are layered on top, then `files`/`include`/`exclude` are
//! expanded into the list of root files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::diagnostics::Diagnostic;
use crate::error::{ConfigError, ConfigResult};
use crate::options::{normalize, CompilerOptions};

pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

const DEFAULT_EXCLUDES: [&str; 3] = ["node_modules", "bower_components", "jspm_packages"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    extends: Option<Extends>,
    compiler_options: Option<CompilerOptions>,
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    references: Option<Vec<RawReference>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawReference {
    path: String,
}

/// A reference to another project's configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectReference {
    pub path: PathBuf,
}

/// A fully resolved configuration file.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub options: CompilerOptions,
    pub file_names: Vec<PathBuf>,
    pub project_references: Vec<ProjectReference>,
    pub errors: Vec<Diagnostic>,
    pub config_path: PathBuf,
}

impl ParsedConfig {
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("."))
    }

    /// The project's name: its directory's base name.
    pub fn name(&self) -> String {
        self.config_dir()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Patterns together with the directory they are relative to.
#[derive(Debug, Clone)]
struct Specs {
    patterns: Vec<String>,
    base: PathBuf,
}

/// One configuration file with its `extends` chain applied.
#[derive(Debug, Default)]
struct Loaded {
    options: CompilerOptions,
    files: Option<Specs>,
    include: Option<Specs>,
    exclude: Option<Specs>,
}

/// Walks up from `start` looking for a `tsconfig.json`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Reads the configuration at `path` (a file, or a directory holding a
/// `tsconfig.json`) and applies `overrides` on top of its options.
pub fn parse_config(path: &Path, overrides: &CompilerOptions) -> ConfigResult<ParsedConfig> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    if !config_path.is_file() {
        return Err(ConfigError::NotFound(
            config_path.parent().unwrap_or(path).to_path_buf(),
        ));
    }
    let config_path = normalize(&absolute(&config_path));
    let config_dir = config_path.parent().unwrap_or(Path::new("/")).to_path_buf();

    let raw = read_raw(&config_path)?;
    let references = raw
        .references
        .iter()
        .flatten()
        .map(|reference| ProjectReference {
            path: reference_config_path(&config_dir.join(&reference.path)),
        })
        .collect::<Vec<_>>();
    let files_declared = raw.files.as_ref().map(Vec::len);
    let has_include = raw.include.is_some();

    let mut chain = vec![config_path.clone()];
    let loaded = load(raw, &config_path, &mut chain)?;

    let mut options = loaded.options.merged(overrides);
    options.config_file_path = Some(config_path.clone());

    let mut errors = Vec::new();
    let file_names = expand_file_names(&loaded, &options, &config_dir, &mut errors);

    if file_names.is_empty() {
        match files_declared {
            Some(0) if references.is_empty() && !has_include => errors.push(Diagnostic::global(
                18002,
                format!("The 'files' list in config file '{}' is empty.", config_path.display()),
            )),
            None if references.is_empty() => {
                let include = loaded
                    .include
                    .as_ref()
                    .map(|specs| specs.patterns.clone())
                    .unwrap_or_else(|| vec!["**/*".to_string()]);
                let exclude = loaded
                    .exclude
                    .as_ref()
                    .map(|specs| specs.patterns.clone())
                    .unwrap_or_default();
                errors.push(Diagnostic::global(
                    18003,
                    format!(
                        "No inputs were found in config file '{}'. Specified 'include' paths were '{}' and 'exclude' paths were '{}'.",
                        config_path.display(),
                        json_list(&include),
                        json_list(&exclude),
                    ),
                ));
            }
            _ => {}
        }
    }

    debug!(
        config = %config_path.display(),
        files = file_names.len(),
        references = references.len(),
        "parsed configuration"
    );

    Ok(ParsedConfig {
        options,
        file_names,
        project_references: references,
        errors,
        config_path,
    })
}

fn read_raw(path: &Path) -> ConfigResult<RawConfig> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::read(path, source))?;
    json5::from_str(&text).map_err(|error| ConfigError::Syntax {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn load(raw: RawConfig, path: &Path, chain: &mut Vec<PathBuf>) -> ConfigResult<Loaded> {
    let dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();

    let bases = match raw.extends {
        None => Vec::new(),
        Some(Extends::One(specifier)) => vec![specifier],
        Some(Extends::Many(specifiers)) => specifiers,
    };

    let mut loaded = Loaded::default();
    for specifier in bases {
        let base_path = resolve_extends(&specifier, &dir).ok_or_else(|| ConfigError::ExtendsNotFound {
            specifier: specifier.clone(),
            from: path.to_path_buf(),
        })?;
        if chain.contains(&base_path) {
            return Err(ConfigError::CircularExtends(base_path));
        }
        chain.push(base_path.clone());
        let base_raw = read_raw(&base_path)?;
        let base = load(base_raw, &base_path, chain)?;
        chain.pop();

        loaded.options = loaded.options.merged(&base.options);
        loaded.files = base.files.or(loaded.files);
        loaded.include = base.include.or(loaded.include);
        loaded.exclude = base.exclude.or(loaded.exclude);
    }

    let mut own = raw.compiler_options.unwrap_or_default();
    own.resolve_paths(&dir);
    loaded.options = loaded.options.merged(&own);

    let specs = |patterns: Option<Vec<String>>| {
        patterns.map(|patterns| Specs {
            patterns,
            base: dir.clone(),
        })
    };
    if raw.files.is_some() {
        loaded.files = specs(raw.files);
    }
    if raw.include.is_some() {
        loaded.include = specs(raw.include);
    }
    if raw.exclude.is_some() {
        loaded.exclude = specs(raw.exclude);
    }
    Ok(loaded)
}

/// Finds the file an `extends` entry names: a path relative to the
/// extending file, an absolute path, or a module inside `node_modules`.
fn resolve_extends(specifier: &str, dir: &Path) -> Option<PathBuf> {
    let with_json = |path: PathBuf| {
        if path.is_file() {
            return Some(path);
        }
        if path.extension().is_some_and(|ext| ext == "json") {
            return None;
        }
        let mut name = path.into_os_string();
        name.push(".json");
        let path = PathBuf::from(name);
        path.is_file().then_some(path)
    };

    let direct = Path::new(specifier);
    if direct.is_absolute() || specifier.starts_with("./") || specifier.starts_with("../") {
        return with_json(normalize(&dir.join(direct)));
    }

    dir.ancestors().find_map(|ancestor| {
        let candidate = ancestor.join("node_modules").join(specifier);
        with_json(candidate.clone()).or_else(|| {
            let nested = candidate.join(CONFIG_FILE_NAME);
            nested.is_file().then_some(nested)
        })
    })
}

fn reference_config_path(path: &Path) -> PathBuf {
    let path = normalize(path);
    if path.extension().is_some_and(|ext| ext == "json") {
        path
    } else {
        path.join(CONFIG_FILE_NAME)
    }
}

fn expand_file_names(
    loaded: &Loaded,
    options: &CompilerOptions,
    config_dir: &Path,
    errors: &mut Vec<Diagnostic>,
) -> Vec<PathBuf> {
    let mut file_names = Vec::new();
    let mut seen = BTreeSet::new();

    if let Some(files) = &loaded.files {
        for file in &files.patterns {
            let path = normalize(&files.base.join(file));
            if !path.is_file() {
                errors.push(Diagnostic::global(6053, format!("File '{}' not found.", path.display())));
                continue;
            }
            if seen.insert(path.clone()) {
                file_names.push(path);
            }
        }
    }

    let include = match (&loaded.include, &loaded.files) {
        (Some(include), _) => include.clone(),
        (None, Some(_)) => return file_names,
        (None, None) => Specs {
            patterns: vec!["**/*".to_string()],
            base: config_dir.to_path_buf(),
        },
    };

    let exclude = exclude_patterns(loaded, options, config_dir);
    let mut matched = BTreeSet::new();
    for pattern in &include.patterns {
        let Some((root, matcher)) = include_matcher(&include.base, pattern) else {
            continue;
        };
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), &exclude));
        for entry in walker.filter_map(Result::ok) {
            let path = entry.path();
            if entry.file_type().is_file()
                && has_supported_extension(path)
                && matcher.matches_path_with(path, match_options())
            {
                matched.insert(path.to_path_buf());
            }
        }
    }

    // a `.d.ts` next to the `.ts` it was generated from is ignored
    let sources: BTreeSet<PathBuf> = matched
        .iter()
        .filter(|path| !is_declaration_file(path))
        .map(|path| path.with_extension(""))
        .collect();
    for path in matched {
        if is_declaration_file(&path) {
            let stem = path.to_string_lossy().trim_end_matches(".d.ts").to_string();
            if sources.contains(Path::new(&stem)) {
                continue;
            }
        }
        if seen.insert(path.clone()) {
            file_names.push(path);
        }
    }
    file_names
}

fn exclude_patterns(loaded: &Loaded, options: &CompilerOptions, config_dir: &Path) -> Vec<Pattern> {
    let specs = match &loaded.exclude {
        Some(specs) => specs.patterns.iter().map(|p| (specs.base.as_path(), p.clone())).collect::<Vec<_>>(),
        None => {
            let mut defaults = DEFAULT_EXCLUDES
                .iter()
                .map(|p| (config_dir, p.to_string()))
                .collect::<Vec<_>>();
            for dir in [&options.out_dir, &options.declaration_dir].into_iter().flatten() {
                defaults.push((config_dir, dir.to_string_lossy().into_owned()));
            }
            defaults
        }
    };

    let mut patterns = Vec::new();
    for (base, spec) in specs {
        let absolute = pattern_text(base, &spec);
        for text in [absolute.clone(), format!("{}/**/*", absolute.trim_end_matches('/'))] {
            if let Ok(pattern) = Pattern::new(&text) {
                patterns.push(pattern);
            }
        }
    }
    patterns
}

fn is_excluded(path: &Path, exclude: &[Pattern]) -> bool {
    exclude.iter().any(|pattern| pattern.matches_path_with(path, match_options()))
}

/// The directory to walk for an include pattern and the pattern files
/// under it must match.
fn include_matcher(base: &Path, spec: &str) -> Option<(PathBuf, Pattern)> {
    let mut spec = spec.trim_end_matches('/').to_string();
    let last = spec.rsplit('/').next().unwrap_or(&spec);
    if !has_wildcard(last) && !last.contains('.') {
        spec.push_str("/**/*");
    }

    let joined = normalize(&base.join(&spec));
    let root = joined
        .ancestors()
        .find(|dir| !dir.components().any(|c| has_wildcard(&c.as_os_str().to_string_lossy())))
        .unwrap_or(base)
        .to_path_buf();
    let pattern = Pattern::new(&pattern_text(base, &spec)).ok()?;
    Some((root, pattern))
}

/// An absolute glob for `spec`, with the base directory escaped.
fn pattern_text(base: &Path, spec: &str) -> String {
    if Path::new(spec).is_absolute() {
        return Pattern::escape(&normalize(Path::new(spec)).to_string_lossy());
    }
    let (prefix, rest) = split_parent_segments(base, spec);
    format!(
        "{}/{}",
        Pattern::escape(prefix.to_string_lossy().trim_end_matches('/')),
        rest.trim_start_matches("./")
    )
}

/// Folds leading `../` segments into the base directory.
fn split_parent_segments<'a>(base: &Path, spec: &'a str) -> (PathBuf, &'a str) {
    let mut base = base.to_path_buf();
    let mut rest = spec.trim_start_matches("./");
    while let Some(stripped) = rest.strip_prefix("../") {
        base.pop();
        rest = stripped;
    }
    (base, rest)
}

fn has_wildcard(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "ts" || ext == "tsx")
}

pub fn is_declaration_file(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".d.ts")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn relative(config: &ParsedConfig) -> Vec<String> {
        config
            .file_names
            .iter()
            .map(|path| path.strip_prefix(config.config_dir()).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_include_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("tsconfig.json"),
            r#"{
                // comments and trailing commas are fine
                "compilerOptions": { "outDir": "lib", "isolatedModules": true, },
            }"#,
        );
        write(&root.join("src/a.ts"), "");
        write(&root.join("src/b.tsx"), "");
        write(&root.join("src/b.js"), "");
        write(&root.join("src/types.d.ts"), "");
        write(&root.join("src/a.d.ts"), "");
        write(&root.join("lib/a.d.ts"), "");
        write(&root.join("node_modules/x/index.ts"), "");

        let config = parse_config(root, &CompilerOptions::default()).unwrap();
        assert!(config.errors.is_empty());
        assert_eq!(relative(&config), vec!["src/a.ts", "src/b.tsx", "src/types.d.ts"]);
        assert_eq!(config.options.out_dir, Some(root.join("lib")));
        assert_eq!(config.options.isolated_modules, Some(true));
        assert_eq!(config.options.config_file_path, Some(root.join("tsconfig.json")));
        assert_eq!(config.name(), root.file_name().unwrap().to_string_lossy());
    }

    #[test]
    fn test_extends_inherits_options_and_include() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("tsconfig.base.json"),
            r#"{ "compilerOptions": { "target": "es2019", "declaration": true }, "include": ["src"] }"#,
        );
        write(
            &root.join("pkg/tsconfig.json"),
            r#"{ "extends": "../tsconfig.base", "compilerOptions": { "declaration": false, "outDir": "dist" } }"#,
        );
        write(&root.join("src/shared.ts"), "");
        write(&root.join("pkg/src/own.ts"), "");

        let config = parse_config(&root.join("pkg/tsconfig.json"), &CompilerOptions::default()).unwrap();
        assert_eq!(config.options.target, Some(tsdual_emit::ScriptTarget::Es2019));
        assert_eq!(config.options.declaration, Some(false));
        assert_eq!(config.options.out_dir, Some(root.join("pkg/dist")));
        // include is relative to the file that declared it
        assert_eq!(config.file_names, vec![root.join("src/shared.ts")]);
    }

    #[test]
    fn test_extends_from_package() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("node_modules/@acme/tsconfig/tsconfig.json"),
            r#"{ "compilerOptions": { "strict": true } }"#,
        );
        write(&root.join("tsconfig.json"), r#"{ "extends": "@acme/tsconfig", "files": ["a.ts"] }"#);
        write(&root.join("a.ts"), "");

        let config = parse_config(root, &CompilerOptions::default()).unwrap();
        assert_eq!(config.options.strict, Some(true));
        assert_eq!(relative(&config), vec!["a.ts"]);
    }

    #[test]
    fn test_circular_extends() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a.json"), r#"{ "extends": "./b.json" }"#);
        write(&root.join("b.json"), r#"{ "extends": "./a.json" }"#);

        let error = parse_config(&root.join("a.json"), &CompilerOptions::default()).unwrap_err();
        assert!(matches!(error, ConfigError::CircularExtends(_)), "{error}");
    }

    #[test]
    fn test_references_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("tsconfig.json"),
            r#"{ "files": [], "references": [{ "path": "./core" }, { "path": "./ui/tsconfig.build.json" }] }"#,
        );
        let overrides = CompilerOptions {
            no_lib: Some(true),
            ..CompilerOptions::default()
        };

        let config = parse_config(root, &overrides).unwrap();
        assert!(config.errors.is_empty());
        assert!(config.file_names.is_empty());
        assert_eq!(config.options.no_lib, Some(true));
        assert_eq!(
            config.project_references,
            vec![
                ProjectReference { path: root.join("core/tsconfig.json") },
                ProjectReference { path: root.join("ui/tsconfig.build.json") },
            ]
        );
    }

    #[test]
    fn test_no_inputs_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("empty/tsconfig.json"), "{}");
        write(&root.join("missing/tsconfig.json"), r#"{ "files": ["gone.ts"] }"#);

        let empty = parse_config(&root.join("empty"), &CompilerOptions::default()).unwrap();
        assert_eq!(empty.errors.len(), 1);
        assert_eq!(empty.errors[0].code, 18003);

        let missing = parse_config(&root.join("missing"), &CompilerOptions::default()).unwrap();
        assert_eq!(missing.errors[0].code, 6053);
    }

    #[test]
    fn test_missing_config_and_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        assert!(matches!(
            parse_config(root, &CompilerOptions::default()),
            Err(ConfigError::NotFound(_))
        ));

        write(&root.join("tsconfig.json"), "{ compilerOptions: ");
        assert!(matches!(
            parse_config(root, &CompilerOptions::default()),
            Err(ConfigError::Syntax { .. })
        ));
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("tsconfig.json"), "{}");
        fs::create_dir_all(root.join("src/deep")).unwrap();

        assert_eq!(find_config_file(&root.join("src/deep")), Some(root.join("tsconfig.json")));
    }
}
