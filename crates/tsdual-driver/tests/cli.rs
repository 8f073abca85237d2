//! End-to-end runs of the tsdual binary.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn tsdual(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("tsdual");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (path, contents) in files {
        let path = temp.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    temp
}

fn read(dir: &TempDir, path: &str) -> String {
    fs::read_to_string(dir.path().join(path)).unwrap()
}

fn modified(dir: &TempDir, path: &str) -> SystemTime {
    fs::metadata(dir.path().join(path)).unwrap().modified().unwrap()
}

const SIMPLE: &str = r#"{ "compilerOptions": { "isolatedModules": true, "outDir": "lib", "target": "es2020" } }"#;

const SOLUTION: &str = r#"{
    // both packages
    "files": [],
    "references": [{ "path": "./packages/app" }, { "path": "./packages/core" }],
}"#;
const CORE: &str = r#"{ "compilerOptions": { "composite": true, "isolatedModules": true, "outDir": "lib" }, "include": ["src"] }"#;
const APP: &str = r#"{
    "compilerOptions": { "composite": true, "isolatedModules": true, "outDir": "lib" },
    "include": ["src"],
    "references": [{ "path": "../core" }]
}"#;

fn solution(root_config: &str) -> TempDir {
    project(&[
        ("tsconfig.json", root_config),
        ("packages/app/tsconfig.json", APP),
        ("packages/app/src/index.ts", "export const app = 'app';\nexport default app;\n"),
        ("packages/core/tsconfig.json", CORE),
        ("packages/core/src/index.ts", "export enum Mode { Dev, Prod }\nexport default Mode;\n"),
    ])
}

#[test]
fn help_lists_options() {
    cargo_bin_cmd!("tsdual")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config-file"))
        .stdout(predicate::str::contains("--no-cjs-root-export"))
        .stdout(predicate::str::contains("--incremental"));
}

#[test]
fn default_export_becomes_the_root_export() {
    let dir = project(&[("tsconfig.json", SIMPLE), ("src/index.ts", "export default 42;\n")]);
    tsdual(dir.path()).assert().success();

    let cjs = read(&dir, "lib/index.js");
    assert!(cjs.contains("module.exports = exports = 42;"), "{}", cjs);
    assert!(cjs.contains("__tsu.redefineExports();"), "{}", cjs);
    let esm = read(&dir, "es/index.mjs");
    assert!(esm.contains("export default 42;"), "{}", esm);
    assert!(!esm.contains("exports"), "{}", esm);
}

#[test]
fn no_cjs_root_export_keeps_plain_commonjs() {
    let dir = project(&[("tsconfig.json", SIMPLE), ("src/index.ts", "export default 42;\n")]);
    tsdual(dir.path()).arg("-R").assert().success();

    let cjs = read(&dir, "lib/index.js");
    assert!(cjs.contains("exports.default = 42;"), "{}", cjs);
    assert!(!cjs.contains("module.exports"), "{}", cjs);
}

#[test]
fn missing_isolated_modules_fails_before_writing() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "compilerOptions": { "outDir": "lib" } }"#),
        ("src/index.ts", "export default 42;\n"),
    ]);
    tsdual(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("depends on the isolatedModules option"))
        .stderr(predicate::str::contains("Process exiting with error code '1'."));
    assert!(!dir.path().join("lib").exists());
    assert!(!dir.path().join("es").exists());
}

#[test]
fn type_errors_fail_the_build() {
    let dir = project(&[
        ("tsconfig.json", SIMPLE),
        ("src/index.ts", "import { missing } from './nowhere';\nexport default missing;\n"),
    ]);
    tsdual(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Found syntax or type errors. Exiting."));
    assert!(!dir.path().join("lib/index.js").exists());
}

#[test]
fn missing_config_exits_with_two() {
    let dir = TempDir::new().unwrap();
    tsdual(dir.path())
        .arg("--config-file")
        .arg("nowhere/tsconfig.json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Process exiting with error code '2'."));
}

#[test]
fn config_is_found_from_a_subdirectory() {
    let dir = project(&[("tsconfig.json", SIMPLE), ("src/index.ts", "export const a = 1;\n")]);
    tsdual(&dir.path().join("src")).assert().success();
    assert!(dir.path().join("lib/index.js").is_file());
    assert!(dir.path().join("es/index.mjs").is_file());
}

#[test]
fn references_are_built_before_their_dependents() {
    let dir = solution(SOLUTION);
    tsdual(dir.path())
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("multi-simple"));

    // composite projects emit below their own directory
    let core = modified(&dir, "packages/core/lib/src/index.js");
    let app = modified(&dir, "packages/app/lib/src/index.js");
    assert!(core <= app);
    assert!(read(&dir, "packages/core/lib/src/index.js").contains("module.exports = exports = Mode;"));
    assert!(dir.path().join("packages/app/es/src/index.mjs").is_file());
}

#[test]
fn circular_references_are_fatal() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "files": [], "references": [{ "path": "./a" }] }"#),
        ("a/tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true }, "references": [{ "path": "../b" }] }"#),
        ("a/index.ts", "export const a = 1;\n"),
        ("b/tsconfig.json", r#"{ "compilerOptions": { "isolatedModules": true }, "references": [{ "path": "../a" }] }"#),
        ("b/index.ts", "export const b = 1;\n"),
    ]);
    tsdual(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Circular project reference detected: "));
}

#[test]
fn incremental_builds_skip_up_to_date_projects() {
    let dir = solution(SOLUTION);
    tsdual(dir.path()).arg("--incremental").assert().success();
    assert!(dir.path().join("packages/core/es/src/index.mjs").is_file());
    assert!(dir.path().join("packages/app/es/src/index.mjs").is_file());

    let companions = dir.path().join("node_modules/.cache/tsdual");
    let aggregator = companions.join("tsconfig.esm.json");
    let written = fs::metadata(&aggregator).unwrap().modified().unwrap();
    let cjs = modified(&dir, "packages/core/lib/src/index.js");

    tsdual(dir.path())
        .arg("--incremental")
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("status=up to date"))
        .stderr(predicate::str::contains("companion configuration unchanged"));
    assert_eq!(fs::metadata(&aggregator).unwrap().modified().unwrap(), written);
    assert_eq!(modified(&dir, "packages/core/lib/src/index.js"), cjs);

    tsdual(dir.path())
        .arg("--incremental")
        .arg("--clean")
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("building CommonJS"));
    assert!(dir.path().join("packages/core/lib/src/index.js").is_file());
    assert!(dir.path().join("packages/core/es/src/index.mjs").is_file());
}
