//! Integration tests for pipekit-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pipekit_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("pipekit");
    cmd.env_remove("GITHUB_ENV").env_remove("PIPEKIT_LOG");
    cmd
}

fn sample_tree() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    fs::create_dir_all(temp.path().join("app/lib")).unwrap();
    fs::create_dir_all(temp.path().join("app/logs")).unwrap();
    fs::write(temp.path().join("app/lib/core.so"), "core").unwrap();
    fs::write(temp.path().join("app/readme.txt"), "read me").unwrap();
    temp
}

fn zip_names(archive: &Path) -> Vec<String> {
    let file = fs::File::open(archive).unwrap();
    let zip = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    names
}

fn pack(src: &Path, archive: &Path) {
    pipekit_cmd()
        .arg("zip")
        .arg("-i")
        .arg(src)
        .arg("-o")
        .arg(archive)
        .assert()
        .success();
}

#[test]
fn test_version_flag() {
    pipekit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pipekit"));
}

#[test]
fn test_help_lists_commands() {
    pipekit_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("append-zip"))
        .stdout(predicate::str::contains("resolve-path"));
}

#[test]
fn test_zip_creates_archive() {
    let src = sample_tree();
    let archive = src.path().join("out/app.zip");

    pipekit_cmd()
        .arg("zip")
        .arg("-i")
        .arg(src.path().join("app"))
        .arg("-o")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive written"));

    assert_eq!(
        zip_names(&archive),
        vec!["lib/core.so", "logs/", "readme.txt"]
    );
}

#[test]
fn test_zip_input_pattern_must_match_once() {
    let src = sample_tree();
    pipekit_cmd()
        .arg("zip")
        .arg("-i")
        .arg(format!("{}/app/*", src.path().display()))
        .arg("-o")
        .arg(src.path().join("x.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected exactly one"));
}

#[test]
fn test_zip_with_filter_json_output() {
    let src = sample_tree();
    let archive = src.path().join("libs.zip");

    let output = pipekit_cmd()
        .arg("--json")
        .arg("zip")
        .arg("-i")
        .arg(src.path().join("app"))
        .arg("-o")
        .arg(&archive)
        .arg("-f")
        .arg(r"\.so$")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "pack");
    assert_eq!(json["data"]["files_added"], 1);
    assert_eq!(json["data"]["skipped_filtered"], 2);
    assert_eq!(zip_names(&archive), vec!["lib/core.so"]);
}

#[test]
fn test_zip_invalid_filter() {
    let src = sample_tree();
    pipekit_cmd()
        .arg("zip")
        .arg("-i")
        .arg(src.path().join("app"))
        .arg("-o")
        .arg(src.path().join("x.zip"))
        .arg("-f")
        .arg("(unclosed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter regex"));
}

#[test]
fn test_append_zip_with_subfolder() {
    let src = sample_tree();
    let archive = src.path().join("bundle.zip");
    pack(&src.path().join("app"), &archive);

    fs::write(src.path().join("extra.txt"), "extra").unwrap();
    pipekit_cmd()
        .arg("append-zip")
        .arg("-i")
        .arg(src.path().join("extra.txt"))
        .arg("-o")
        .arg(&archive)
        .arg("-s")
        .arg("docs")
        .assert()
        .success();

    assert_eq!(
        zip_names(&archive),
        vec!["docs/extra.txt", "lib/core.so", "logs/", "readme.txt"]
    );
}

#[test]
fn test_unzip_round_trip_with_root() {
    let src = sample_tree();
    let archive = src.path().join("tree.zip");
    pack(src.path(), &archive);

    let dest = TempDir::new().unwrap();
    pipekit_cmd()
        .arg("unzip")
        .arg("-i")
        .arg(&archive)
        .arg("-o")
        .arg(dest.path())
        .arg("-r")
        .arg("app")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files extracted: 2"));

    assert_eq!(fs::read_to_string(dest.path().join("lib/core.so")).unwrap(), "core");
    assert!(dest.path().join("logs").is_dir());
}

#[test]
fn test_untgz_keeps_existing_without_overwrite() {
    let src = sample_tree();
    let archive = src.path().join("app.tgz");
    pack(&src.path().join("app"), &archive);

    let dest = TempDir::new().unwrap();
    fs::write(dest.path().join("readme.txt"), "local").unwrap();

    pipekit_cmd()
        .arg("untgz")
        .arg("-i")
        .arg(&archive)
        .arg("-o")
        .arg(dest.path())
        .assert()
        .success();
    assert_eq!(fs::read_to_string(dest.path().join("readme.txt")).unwrap(), "local");

    pipekit_cmd()
        .arg("untgz")
        .arg("-i")
        .arg(&archive)
        .arg("-o")
        .arg(dest.path())
        .arg("--overwrite")
        .assert()
        .success();
    assert_eq!(fs::read_to_string(dest.path().join("readme.txt")).unwrap(), "read me");
}

#[test]
fn test_untxz_round_trip() {
    let src = sample_tree();
    let archive = src.path().join("app.tar.xz");
    pack(&src.path().join("app"), &archive);

    let dest = TempDir::new().unwrap();
    pipekit_cmd()
        .arg("untxz")
        .arg("-i")
        .arg(&archive)
        .arg("-o")
        .arg(dest.path())
        .assert()
        .success();
    assert!(dest.path().join("lib/core.so").is_file());
}

#[test]
fn test_unpack_filter_matches_nothing() {
    let src = sample_tree();
    let archive = src.path().join("app.zip");
    pack(&src.path().join("app"), &archive);

    let dest = TempDir::new().unwrap();
    pipekit_cmd()
        .arg("unpack")
        .arg("-i")
        .arg(&archive)
        .arg("-o")
        .arg(dest.path())
        .arg("-f")
        .arg(r"\.dll$")
        .assert()
        .failure()
        .stderr(predicate::str::contains("matched filter"));
}

#[test]
fn test_unpack_unknown_extension() {
    let src = sample_tree();
    let bogus = src.path().join("data.rar");
    fs::write(&bogus, "not an archive").unwrap();
    pipekit_cmd()
        .arg("unpack")
        .arg("-i")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Archive format not supported"));
}

#[test]
fn test_fetch_unpack_local_file() {
    let src = sample_tree();
    let archive = src.path().join("app.zip");
    pack(&src.path().join("app"), &archive);

    let dest = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    pipekit_cmd()
        .arg("fetch-unpack")
        .arg("-u")
        .arg(format!("file://{}", archive.display()))
        .arg("-t")
        .arg(staging.path())
        .arg("-o")
        .arg(dest.path())
        .assert()
        .success();

    assert!(dest.path().join("readme.txt").is_file());
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
}

#[test]
fn test_resolve_path_sets_variable_in_file() {
    let src = sample_tree();
    let env_file = src.path().join("github_env");

    pipekit_cmd()
        .arg("--env-sink")
        .arg("file")
        .arg("--env-file")
        .arg(&env_file)
        .arg("resolve-path")
        .arg("-i")
        .arg(format!("{}/**/*.so", src.path().display()))
        .arg("-v")
        .arg("CORE_LIB")
        .assert()
        .success()
        .stdout(predicate::str::contains("core.so"))
        .stdout(predicate::str::contains("Setting environment variable CORE_LIB"));

    let expected = format!(
        "CORE_LIB={}\n",
        src.path().join("app/lib/core.so").display()
    );
    assert_eq!(fs::read_to_string(&env_file).unwrap(), expected);
}

#[test]
fn test_resolve_path_directory_mode() {
    let src = sample_tree();
    pipekit_cmd()
        .arg("--env-sink")
        .arg("process")
        .arg("resolve-path")
        .arg("-i")
        .arg(format!("{}/app/lib/*", src.path().display()))
        .arg("-d")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            src.path().join("app/lib").display().to_string(),
        ));
}

#[test]
fn test_resolve_path_multiple_matches_fail() {
    let src = sample_tree();
    pipekit_cmd()
        .arg("--env-sink")
        .arg("process")
        .arg("resolve-path")
        .arg("-i")
        .arg(format!("{}/app/*", src.path().display()))
        .assert()
        .failure()
        .stdout(predicate::str::contains("readme.txt"))
        .stderr(predicate::str::contains("matched 3 paths"));
}

#[test]
fn test_cpu_info_ci_protocol() {
    pipekit_cmd()
        .arg("--env-sink")
        .arg("ci")
        .arg("cpu-info")
        .arg("-i")
        .arg("count")
        .arg("-v")
        .arg("CPU_COUNT")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "##vso[task.setvariable variable=CPU_COUNT]",
        ));
}

#[test]
fn test_cpu_info_json() {
    let output = pipekit_cmd()
        .arg("--json")
        .arg("cpu-info")
        .arg("-i")
        .arg("os")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "cpu-info");
    assert!(json["data"]["value"].is_string());
}

#[test]
fn test_json_with_variable_keeps_stdout_parseable() {
    let output = pipekit_cmd()
        .arg("--json")
        .arg("cpu-info")
        .arg("-i")
        .arg("os")
        .arg("-v")
        .arg("HOST_OS")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["data"]["variable"], "HOST_OS");
    assert!(!String::from_utf8_lossy(&output).contains("##vso"));
}

#[test]
fn test_json_with_ci_sink_is_rejected() {
    pipekit_cmd()
        .arg("--json")
        .arg("--env-sink")
        .arg("ci")
        .arg("cpu-info")
        .arg("-i")
        .arg("os")
        .arg("-v")
        .arg("HOST_OS")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_failed_variable_set_is_not_announced() {
    pipekit_cmd()
        .arg("--env-sink")
        .arg("process")
        .arg("cpu-info")
        .arg("-i")
        .arg("count")
        .arg("-v")
        .arg("BAD=NAME")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Setting environment variable").not());
}

#[test]
fn test_echo_prints_invocation() {
    pipekit_cmd()
        .arg("--echo")
        .arg("cpu-info")
        .arg("-i")
        .arg("arch")
        .assert()
        .success()
        .stderr(predicate::str::contains("cpu-info -i arch"));
}

#[test]
fn test_completion_bash() {
    pipekit_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("pipekit"));
}
