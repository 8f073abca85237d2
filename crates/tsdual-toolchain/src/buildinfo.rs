//! `.tsbuildinfo` files: what an incremental build last saw.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, Result, ToolchainError};
use crate::host::CompilerHost;
use crate::options::CompilerOptions;

pub const BUILD_INFO_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    pub options_hash: String,
    /// Source file path to the hash of its contents
    pub files: BTreeMap<String, String>,
    pub outputs: Vec<String>,
    /// Referenced projects' build info path to the hash of that file
    #[serde(default)]
    pub references: BTreeMap<String, String>,
}

impl BuildInfo {
    /// `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<BuildInfo>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::read(path, source).into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ToolchainError::BuildInfo {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn write(&self, path: &Path, host: &dyn CompilerHost) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ToolchainError::BuildInfo {
            path: path.to_path_buf(),
            source,
        })?;
        host.write_file(path, &text).map_err(|source| ToolchainError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Where the build info for a configuration lives, if it has one.
pub fn build_info_path(options: &CompilerOptions) -> Option<PathBuf> {
    if let Some(path) = &options.ts_build_info_file {
        return Some(path.clone());
    }
    let config = options.config_file_path.as_deref()?;
    let stem = config.file_stem()?.to_string_lossy();
    let dir = match &options.out_dir {
        Some(out_dir) => out_dir.clone(),
        None => config.parent()?.to_path_buf(),
    };
    Some(dir.join(format!("{}.tsbuildinfo", stem)))
}

pub fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

pub fn hash_file(path: &Path) -> Option<String> {
    fs::read(path).ok().map(|bytes| hex::encode(Sha256::digest(bytes)))
}

/// Hash of the options that affect emitted output.
pub fn options_hash(options: &CompilerOptions) -> String {
    hash_text(&serde_json::to_string(options).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SystemHost;

    #[test]
    fn test_default_location() {
        let options = CompilerOptions {
            config_file_path: Some(PathBuf::from("/p/tsconfig.build.json")),
            ..CompilerOptions::default()
        };
        assert_eq!(build_info_path(&options), Some(PathBuf::from("/p/tsconfig.build.tsbuildinfo")));

        let with_out_dir = CompilerOptions {
            out_dir: Some(PathBuf::from("/p/lib")),
            ..options.clone()
        };
        assert_eq!(build_info_path(&with_out_dir), Some(PathBuf::from("/p/lib/tsconfig.build.tsbuildinfo")));

        assert_eq!(build_info_path(&CompilerOptions::default()), None);
    }

    #[test]
    fn test_hashes() {
        assert_eq!(
            hash_text(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let declaration = CompilerOptions {
            declaration: Some(true),
            ..CompilerOptions::default()
        };
        assert_ne!(options_hash(&declaration), options_hash(&CompilerOptions::default()));
    }

    #[test]
    fn test_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib/tsconfig.tsbuildinfo");
        assert_eq!(BuildInfo::read(&path).unwrap(), None);

        let info = BuildInfo {
            version: BUILD_INFO_VERSION.to_string(),
            options_hash: options_hash(&CompilerOptions::default()),
            files: BTreeMap::from([("/p/a.ts".to_string(), hash_text("a"))]),
            outputs: vec!["/p/lib/a.js".to_string()],
            references: BTreeMap::new(),
        };
        info.write(&path, &SystemHost::new()).unwrap();
        assert_eq!(BuildInfo::read(&path).unwrap(), Some(info));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(BuildInfo::read(&path), Err(ToolchainError::BuildInfo { .. })));
    }
}
