//! End-to-end tests for the `tmplkit` binary.
//!
//! Each test runs the compiled CLI against templates in a private
//! temporary directory and checks output files, exit codes, and stderr.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn tmplkit() -> Command {
    Command::cargo_bin("tmplkit").expect("binary builds")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

const TEMPLATE: &str = "NAME1={{ NAME1 }}\nNAME2={{ NAME2 }}\n";

#[test]
fn render_with_full_mapping_succeeds() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", TEMPLATE);
    let values = write_file(&dir, "vars.yaml", "NAME1: ham\nNAME2: eggs\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "fail"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();

    assert_eq!(read(&output), "NAME1=ham\nNAME2=eggs\n");
}

#[test]
fn fail_policy_names_missing_variable_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", TEMPLATE);
    let values = write_file(&dir, "vars.yaml", "NAME1: ham\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "fail"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME2"));

    assert!(!output.exists());
}

#[test]
fn skip_policy_drops_lines_referencing_missing_variables() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", TEMPLATE);
    let values = write_file(&dir, "vars.yaml", "NAME1: ham\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "skip"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();

    let rendered = read(&output);
    assert_eq!(rendered, "NAME1=ham\n");
    assert!(!rendered.contains("NAME2"));
}

#[test]
fn warn_policy_is_default_and_keeps_residual_markers() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", TEMPLATE);
    let values = write_file(&dir, "vars.yaml", "NAME1: ham\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .arg("render")
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();

    assert_eq!(read(&output), "NAME1=ham\nNAME2={{ NAME2 }}\n");
}

#[test]
fn warn_policy_logs_each_unresolved_variable_once() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", TEMPLATE);
    let values = write_file(&dir, "vars.yaml", "NAME1: ham\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .arg("render")
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success()
        .stderr(predicate::function(|log: &str| {
            log.matches("rendering with unresolved variables").count() == 1
        }));
}

#[test]
fn template_without_placeholders_is_rendered_verbatim() {
    let dir = TempDir::new().unwrap();
    let text = "plain line one\nplain line two\n";
    let template = write_file(&dir, "t.tmpl", text);
    let output = dir.path().join("out.conf");

    // No values at all: the identity law still holds.
    tmplkit()
        .arg("render")
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(read(&output), text);
}

#[test]
fn empty_mapping_for_template_with_variables_fails() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", TEMPLATE);
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "warn"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No template values"));

    assert!(!output.exists());
}

#[test]
fn missing_template_file_fails_before_any_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--set", "A=1"])
        .arg("--template")
        .arg(dir.path().join("absent.tmpl"))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert!(!output.exists());
}

#[test]
fn set_overrides_take_precedence_over_values_file() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "x={{ X }}\ny={{ Y }}\n");
    let values = write_file(&dir, "vars.yaml", "X: from-file\nY: kept\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "fail", "--set", "X=from-set"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();

    assert_eq!(read(&output), "x=from-set\ny=kept\n");
}

#[test]
fn set_values_keep_their_scalar_types() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "n={{ N }}\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "fail", "--set", "N=42"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(read(&output), "n=42\n");
}

#[test]
fn malformed_set_expression_is_rejected() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "x={{ X }}\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--set", "NOEQUALS"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn f90_bool_renders_fortran_tokens() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.nml.tmpl", "do_physics={{ DO_PHYSICS }}\nuse_ozone={{ USE_OZONE }}\n");
    let values = write_file(&dir, "vars.yaml", "DO_PHYSICS: true\nUSE_OZONE: false\n");
    let output = dir.path().join("out.nml");

    tmplkit()
        .args(["render", "--on-missing", "fail", "--f90-bool"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();

    let rendered = read(&output);
    assert_eq!(rendered, "do_physics=T\nuse_ozone=F\n");
    assert!(!rendered.contains("true"));
    assert!(!rendered.contains("false"));
}

#[test]
fn normalize_markers_handles_legacy_dialects() {
    let dir = TempDir::new().unwrap();
    let template = write_file(
        &dir,
        "t.tmpl",
        "a=[@ALPHA]\nb={@BETA}\nc={%GAMMA%}\nd=<DELTA>\ne={{ EPSILON }}\n",
    );
    let values = write_file(
        &dir,
        "vars.yaml",
        "ALPHA: 1\nBETA: 2\nGAMMA: 3\nDELTA: 4\nEPSILON: 5\n",
    );
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--on-missing", "fail", "--normalize-markers"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();

    assert_eq!(read(&output), "a=1\nb=2\nc=3\nd=4\ne=5\n");
}

#[test]
fn literal_engine_strips_trailing_whitespace() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "a={{ A }}   \nplain   \n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--engine", "literal", "--set", "A=x"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(read(&output), "a=x\nplain\n");
}

#[test]
fn render_overwrites_existing_output() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "x={{ X }}\n");
    let output = write_file(&dir, "out.conf", "stale content\n");

    tmplkit()
        .args(["render", "--on-missing", "fail", "--set", "X=fresh"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(read(&output), "x=fresh\n");
}

#[test]
#[serial]
fn templates_can_read_environment_variables() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "home={{ env.TMPLKIT_IT_VAR }}\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .arg("render")
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .env("TMPLKIT_IT_VAR", "cycled")
        .assert()
        .success();

    assert_eq!(read(&output), "home=cycled\n");
}

#[test]
fn vars_lists_variables_in_discovery_order() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "b={{ BETA }}\na={{ ALPHA }}\nb2={{ BETA }}\n");

    tmplkit()
        .arg("vars")
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::eq("BETA\nALPHA\n"));
}

#[test]
fn vars_sees_legacy_dialects_with_normalization() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "a=[@ALPHA]\nb=<BETA>\n");

    tmplkit()
        .args(["vars", "--normalize-markers"])
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::eq("ALPHA\nBETA\n"));
}

#[test]
fn syntax_errors_are_wrapped_with_the_output_path() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "t.tmpl", "{{ A + }}\n");
    let output = dir.path().join("out.conf");

    tmplkit()
        .args(["render", "--set", "A=1"])
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render"));

    assert!(!output.exists());
}
