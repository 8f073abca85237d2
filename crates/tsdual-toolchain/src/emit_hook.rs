//! Output file naming, with a process-wide hook for the emitted extension.
//!
//! Every program asks [`output_extension`] which extension to give the
//! JavaScript it writes. A caller that needs a different extension for a
//! while (`.mjs` for ES module output) installs a hook and restores the
//! previous one afterwards.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::options::CompilerOptions;

/// Picks the extension (with its leading dot) for the JavaScript emitted
/// from a source file.
pub type OutputExtensionHook = fn(&Path, &CompilerOptions) -> &'static str;

static OUTPUT_EXTENSION_HOOK: RwLock<Option<OutputExtensionHook>> = RwLock::new(None);

/// Installs `hook` (or clears it with `None`) and returns the hook that was
/// active before.
pub fn replace_output_extension_hook(hook: Option<OutputExtensionHook>) -> Option<OutputExtensionHook> {
    let mut slot = OUTPUT_EXTENSION_HOOK
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, hook)
}

pub fn current_output_extension_hook() -> Option<OutputExtensionHook> {
    *OUTPUT_EXTENSION_HOOK
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// The extension a source file compiles to when no hook is installed.
pub fn default_output_extension(source: &Path, _options: &CompilerOptions) -> &'static str {
    let name = source.to_string_lossy();
    if name.ends_with(".mts") {
        ".mjs"
    } else if name.ends_with(".cts") {
        ".cjs"
    } else {
        ".js"
    }
}

pub fn output_extension(source: &Path, options: &CompilerOptions) -> &'static str {
    match current_output_extension_hook() {
        Some(hook) => hook(source, options),
        None => default_output_extension(source, options),
    }
}

/// `source` without its TypeScript extension.
pub fn remove_ts_extension(source: &Path) -> PathBuf {
    let text = source.to_string_lossy();
    for extension in [".d.ts", ".d.mts", ".d.cts", ".ts", ".tsx", ".mts", ".cts"] {
        if let Some(stem) = text.strip_suffix(extension) {
            return PathBuf::from(stem);
        }
    }
    source.to_path_buf()
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut text = remove_ts_extension(path).into_os_string();
    text.push(suffix);
    PathBuf::from(text)
}

/// Where `source` lands relative to `out_dir`, if there is one.
fn output_base(source: &Path, out_dir: Option<&Path>, common_source_dir: &Path) -> PathBuf {
    match out_dir {
        Some(out_dir) => match source.strip_prefix(common_source_dir) {
            Ok(relative) => out_dir.join(relative),
            Err(_) => out_dir.join(source.file_name().unwrap_or_default()),
        },
        None => source.to_path_buf(),
    }
}

/// The JavaScript file emitted for `source`.
pub fn own_emit_output_file_path(
    source: &Path,
    options: &CompilerOptions,
    common_source_dir: &Path,
) -> PathBuf {
    let base = output_base(source, options.out_dir.as_deref(), common_source_dir);
    with_suffix(&base, output_extension(source, options))
}

/// The declaration file emitted for `source`.
pub fn declaration_output_file_path(
    source: &Path,
    options: &CompilerOptions,
    common_source_dir: &Path,
) -> PathBuf {
    let dir = options.declaration_dir.as_deref().or(options.out_dir.as_deref());
    with_suffix(&output_base(source, dir, common_source_dir), ".d.ts")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that install a hook or depend on none being set.
    pub(crate) static HOOK_LOCK: Mutex<()> = Mutex::new(());

    fn mjs(_: &Path, _: &CompilerOptions) -> &'static str {
        ".mjs"
    }

    #[test]
    fn test_output_paths() {
        let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let options = CompilerOptions {
            out_dir: Some(PathBuf::from("/p/lib")),
            declaration_dir: Some(PathBuf::from("/p/types")),
            ..CompilerOptions::default()
        };
        let source = Path::new("/p/src/util/a.tsx");
        assert_eq!(
            own_emit_output_file_path(source, &options, Path::new("/p/src")),
            PathBuf::from("/p/lib/util/a.js")
        );
        assert_eq!(
            declaration_output_file_path(source, &options, Path::new("/p/src")),
            PathBuf::from("/p/types/util/a.d.ts")
        );
        assert_eq!(
            own_emit_output_file_path(Path::new("/p/src/a.ts"), &CompilerOptions::default(), Path::new("/p/src")),
            PathBuf::from("/p/src/a.js")
        );
    }

    #[test]
    fn test_hook_replaces_extension_until_restored() {
        let _lock = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let options = CompilerOptions {
            out_dir: Some(PathBuf::from("/p/es")),
            ..CompilerOptions::default()
        };
        let source = Path::new("/p/src/a.ts");

        let previous = replace_output_extension_hook(Some(mjs));
        assert_eq!(
            own_emit_output_file_path(source, &options, Path::new("/p/src")),
            PathBuf::from("/p/es/a.mjs")
        );
        replace_output_extension_hook(previous);
        assert_eq!(output_extension(source, &options), ".js");
    }

    #[test]
    fn test_remove_ts_extension() {
        assert_eq!(remove_ts_extension(Path::new("a/b.d.ts")), PathBuf::from("a/b"));
        assert_eq!(remove_ts_extension(Path::new("a/b.mts")), PathBuf::from("a/b"));
        assert_eq!(remove_ts_extension(Path::new("a/b.json")), PathBuf::from("a/b.json"));
        assert_eq!(
            default_output_extension(Path::new("a.cts"), &CompilerOptions::default()),
            ".cjs"
        );
    }
}
