//! Scoped `.js` to `.mjs` override of the emitted file extension.

use std::path::Path;

use tracing::trace;
use tsdual_toolchain::emit_hook::{default_output_extension, replace_output_extension_hook, OutputExtensionHook};
use tsdual_toolchain::CompilerOptions;

fn mjs_extension(source: &Path, options: &CompilerOptions) -> &'static str {
    match default_output_extension(source, options) {
        ".js" => ".mjs",
        other => other,
    }
}

/// While alive, every program writes `.mjs` where it would write `.js`.
///
/// The previous hook is put back when the guard drops, including while
/// unwinding from a panic.
#[must_use = "the extension override ends when the guard is dropped"]
pub struct MjsExtensionGuard {
    previous: Option<OutputExtensionHook>,
}

impl MjsExtensionGuard {
    pub fn install() -> Self {
        trace!("installing .mjs output extension");
        MjsExtensionGuard {
            previous: replace_output_extension_hook(Some(mjs_extension)),
        }
    }
}

impl Drop for MjsExtensionGuard {
    fn drop(&mut self) {
        trace!("restoring output extension");
        replace_output_extension_hook(self.previous.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdual_toolchain::emit_hook::output_extension;

    #[test]
    fn test_guard_installs_and_restores() {
        let _lock = crate::test_support::hook_lock();
        let options = CompilerOptions::default();
        assert_eq!(output_extension(Path::new("a.ts"), &options), ".js");
        {
            let _guard = MjsExtensionGuard::install();
            assert_eq!(output_extension(Path::new("a.ts"), &options), ".mjs");
            assert_eq!(output_extension(Path::new("b.cts"), &options), ".cjs");
        }
        assert_eq!(output_extension(Path::new("a.ts"), &options), ".js");
    }

    #[test]
    fn test_guard_restores_after_panic() {
        let _lock = crate::test_support::hook_lock();
        let result = std::panic::catch_unwind(|| {
            let _guard = MjsExtensionGuard::install();
            panic!("emit failed");
        });
        assert!(result.is_err());
        assert_eq!(output_extension(Path::new("a.ts"), &CompilerOptions::default()), ".js");
    }
}
