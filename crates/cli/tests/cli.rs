use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SERVICE: &str = "\
int handle(int n) {
#ifdef PATCHED
  if (n > 16)
    return -1;
#else
  n = n;
#endif
  return n;
}
";

#[allow(deprecated)]
fn patchmark(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("patchmark").expect("binary");
    cmd.current_dir(root).env_remove("PATCHMARK_CONFIG");
    cmd
}

fn setup_challenge() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("pov")).unwrap();
    fs::write(root.join("src/service.c"), SERVICE).unwrap();
    fs::write(root.join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(root.join("pov/pov.c"), SERVICE).unwrap();
    temp
}

#[test]
fn manifest_lists_annotated_files() {
    let temp = setup_challenge();

    patchmark(temp.path())
        .args(["manifest", ".", "--show"])
        .assert()
        .success()
        .stdout("src/service.c\n");

    assert_eq!(
        fs::read_to_string(temp.path().join("manifest")).unwrap(),
        "src/service.c\n"
    );
}

#[test]
fn manifest_with_hunks() {
    let temp = setup_challenge();

    patchmark(temp.path())
        .args(["manifest", ".", "--hunks", "--show"])
        .assert()
        .success()
        .stdout("src/service.c:6,7;\n");
}

#[test]
fn patch_artifact_is_json_and_cached() {
    let temp = setup_challenge();

    patchmark(temp.path()).args(["patch", "."]).assert().success();

    let raw = fs::read_to_string(temp.path().join("patch")).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["src/service.c"]["3"][0], "  if (n > 16)\n");
    assert_eq!(json["src/service.c"]["3"][1], "    return -1;\n");

    // A cached artifact is reused unless forced.
    fs::write(temp.path().join("patch"), "{}").unwrap();
    patchmark(temp.path())
        .args(["patch", ".", "--show"])
        .assert()
        .success()
        .stdout("");
    patchmark(temp.path())
        .args(["patch", ".", "--force", "--show"])
        .assert()
        .success()
        .stdout("src/service.c 3 if (n > 16)\nsrc/service.c 4 return -1;\n");
}

#[test]
fn vuln_show_prints_rows() {
    let temp = setup_challenge();

    patchmark(temp.path())
        .args(["vuln", ".", "--show"])
        .assert()
        .success()
        .stdout("src/service.c 6 n = n;\n");
}

#[test]
fn stats_json() {
    let temp = setup_challenge();

    let output = patchmark(temp.path())
        .args(["stats", ".", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["files"], 2);
    assert_eq!(stats["vuln_files"], 1);
    assert_eq!(stats["total_lines"], 10);
    assert_eq!(stats["patch_lines"], 2);
    assert_eq!(stats["vuln_lines"], 1);
}

#[test]
fn remove_patches_rewrites_and_keeps_manifest() {
    let temp = setup_challenge();

    patchmark(temp.path())
        .args(["remove-patches", "."])
        .assert()
        .success()
        .stdout("1\n");

    assert_eq!(
        fs::read_to_string(temp.path().join("src/service.c")).unwrap(),
        "int handle(int n) {\nn = n;\n  return n;\n}\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("manifest")).unwrap(),
        "src/service.c\n"
    );
    // Annotated copies under ignored directories stay untouched.
    assert_eq!(fs::read_to_string(temp.path().join("pov/pov.c")).unwrap(), SERVICE);
}

#[test]
fn remove_patches_from_listing() {
    let temp = setup_challenge();
    fs::write(temp.path().join("listing"), "src/service.c\n").unwrap();

    patchmark(temp.path())
        .args(["remove-patches", ".", "--from-manifest", "listing"])
        .assert()
        .success()
        .stdout("1\n");

    let rewritten = fs::read_to_string(temp.path().join("src/service.c")).unwrap();
    assert!(!rewritten.contains("PATCHED"));
}

#[test]
fn fault_localization_rows() {
    let temp = setup_challenge();

    patchmark(temp.path())
        .args(["fault-loc", ".", "--base", "/work/service"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("fault_localization")).unwrap(),
        "/work/service/src/service.c 6 3 /work/service/src/service.c 6 3\n"
    );
}

#[test]
fn map_instrumented_outputs_json() {
    let temp = setup_challenge();

    let output = patchmark(temp.path())
        .args([
            "map-instrumented",
            ".",
            "--mode",
            "preprocessed",
            "--file",
            "/repair/out/src/service.i",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let mapping: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(mapping["src/service.c"], "/repair/out/src/service.i");
}

#[test]
fn map_instrumented_fails_when_nothing_maps() {
    let temp = setup_challenge();

    patchmark(temp.path())
        .args(["map-instrumented", ".", "--file", "/repair/out/other.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not map"));
}

#[test]
fn clean_removes_generated_artifacts() {
    let temp = setup_challenge();
    patchmark(temp.path()).args(["manifest", "."]).assert().success();
    patchmark(temp.path()).args(["vuln", "."]).assert().success();

    patchmark(temp.path())
        .args(["clean", "."])
        .assert()
        .success()
        .stdout("vuln\nmanifest\n");

    assert!(!temp.path().join("manifest").exists());
    assert!(temp.path().join("src/service.c").exists());
}

#[test]
fn config_file_changes_ignored_dirs() {
    let temp = setup_challenge();
    fs::write(
        temp.path().join("patchmark.toml"),
        "[manifest]\nignored_dirs = [\"src\"]\n",
    )
    .unwrap();

    patchmark(temp.path())
        .args(["--config", "patchmark.toml", "manifest", ".", "--show"])
        .assert()
        .success()
        .stdout("pov/pov.c\n");
}

#[test]
fn unterminated_block_is_reported() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("bad.c"), "#ifdef PATCHED\nfix();\n").unwrap();

    patchmark(temp.path())
        .args(["manifest", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("never closed"));
}
