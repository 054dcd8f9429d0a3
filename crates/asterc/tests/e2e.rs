//! End-to-end tests for the asterc binary.
//!
//! Each test writes an `.aster` source file into a temp directory,
//! invokes the compiled `asterc`, and asserts on exit codes and output.

use std::path::PathBuf;
use std::process::{Command, Output};

/// Find the asterc binary next to the test executable.
fn find_asterc() -> PathBuf {
    let mut path = std::env::current_exe()
        .expect("cannot find current exe")
        .parent()
        .expect("cannot find parent dir")
        .to_path_buf();
    if path.file_name().is_some_and(|n| n == "deps") {
        path = path.parent().unwrap().to_path_buf();
    }
    let asterc = path.join("asterc");
    assert!(
        asterc.exists(),
        "asterc binary not found at {}. Run `cargo build -p asterc` first.",
        asterc.display()
    );
    asterc
}

/// Write `source` to a temp file and run `asterc <subcommand> <file> <extra...>`.
fn run_asterc(subcommand: &str, source: &str, extra: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = dir.path().join("main.aster");
    std::fs::write(&file, source).expect("failed to write source");

    Command::new(find_asterc())
        .arg(subcommand)
        .arg(&file)
        .args(extra)
        .output()
        .expect("failed to invoke asterc")
}

const GREETING: &str = "Module demo. Rule greet given name: Text, produce Text: Return name.\n";

#[test]
fn compile_clean_module_exits_zero() {
    let output = run_asterc("compile", GREETING, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn compile_with_errors_exits_one() {
    let output = run_asterc(
        "compile",
        "Module demo. Rule f produce Int: Return \"x\".\n",
        &[],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("E201"), "stderr: {stderr}");
}

#[test]
fn compile_missing_file_exits_two() {
    let output = Command::new(find_asterc())
        .args(["compile", "/nonexistent/never.aster"])
        .output()
        .expect("failed to invoke asterc");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_lexicon_exits_two() {
    let output = run_asterc("compile", GREETING, &["--lexicon", "tlh"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tlh"), "stderr: {stderr}");
}

#[test]
fn emit_core_prints_versioned_envelope() {
    let output = run_asterc("emit-core", GREETING, &[]);
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("emit-core output should be JSON");
    assert_eq!(value["version"], 1);
    assert_eq!(value["module"]["name"], "demo");
    assert_eq!(value["module"]["decls"][0]["kind"], "Func");
    assert_eq!(value["module"]["decls"][0]["name"], "greet");
}

#[test]
fn emit_core_is_byte_identical_across_runs() {
    let source = "Module demo.\nDefine User has name required, age between 18 and 120.\nRule greet given name: Text, produce Text: Return name.\n";
    let first = run_asterc("emit-core", source, &[]);
    let second = run_asterc("emit-core", source, &[]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn typecheck_reports_source_diagnostics_summary() {
    let source = "Module demo. Rule fetch given url: Text, produce Text: Return Http.get(url).\n";
    let output = run_asterc("typecheck", source, &[]);
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("typecheck output should be JSON");
    assert!(value["source"].as_str().unwrap().contains("Module demo."));
    let diagnostics = value["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["code"], "E301");
    assert_eq!(value["summary"]["errors"], 1);
    assert_eq!(value["summary"]["by_category"]["effect"], 1);
}

#[test]
fn typecheck_filter_codes_narrows_the_report() {
    // One scope error and one shadowing warning.
    let source =
        "Module demo. Rule f given x: Int, produce Int: Let x be 2. Return zzz.\n";
    let output = run_asterc("typecheck", source, &["--filter-codes", "E101"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diagnostics = value["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["code"], "E101");
    assert_eq!(value["summary"]["warnings"], 0);
}

#[test]
fn warnings_alone_still_exit_zero() {
    let source = "Module demo. Rule f of T given a: Int, produce Int: Return a.\n";
    let output = run_asterc("compile", source, &[]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("W021"), "stderr: {stderr}");
}

#[test]
fn capability_manifest_from_environment_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let caps = dir.path().join("caps.json");
    std::fs::write(&caps, r#"{"allow": {"sql": ["*"]}}"#).unwrap();
    let file = dir.path().join("main.aster");
    std::fs::write(
        &file,
        "Module demo. Rule fetch given u: Text, produce Text, it performs Http: Return Http.get(u).\n",
    )
    .unwrap();

    let output = Command::new(find_asterc())
        .args(["compile", file.to_str().unwrap()])
        .env("ASTER_CAPS", caps.to_str().unwrap())
        .output()
        .expect("failed to invoke asterc");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("E352"), "stderr: {stderr}");

    // Enforcement off: the same program passes.
    let output = Command::new(find_asterc())
        .args(["compile", file.to_str().unwrap()])
        .env("ASTER_CAPS", caps.to_str().unwrap())
        .env("ASTER_CAP_EFFECTS_ENFORCE", "0")
        .output()
        .expect("failed to invoke asterc");
    assert!(output.status.success());
}

#[test]
fn scenario_wait_before_start() {
    let source = "Module demo.\nRule race produce Int, it performs Io: Wait for job. Start job as async Io.readLine(). Wait for job. Return 1.\n";
    let output = run_asterc("typecheck", source, &["--filter-codes", "E501,E502"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diagnostics = value["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["code"], "E501");
    assert!(diagnostics[0]["message"]
        .as_str()
        .unwrap()
        .contains("job"));
}
