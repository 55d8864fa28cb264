//! Integration tests for the kotoba query and sample commands

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

const DATASET: &str = r#"[
    {"Nom Japonais": "Sakura", "Nom": "Cerisier", "Description": "Fleur de cerisier", "Tags": ["fleur", "printemps"]},
    {"Nom": "Sora", "Description": "Le ciel", "Tags": "ciel, nature"},
    {"Nom": "Été", "Description": "Saison chaude", "Tags": "saison"},
    {"Nom": "Ete", "Description": "Sans accent"},
    {"Nom": "Autre", "Description": "<b>gras</b> & co"},
    {"Nom": "a+b corp", "Tags": []},
    {"Description": "sans nom", "Tags": "fleur"}
]"#;

/// Isolated environment: a dataset file and a home directory without config
struct TestEnv {
    temp_dir: TempDir,
    data_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_data(DATASET)
    }

    fn with_data(data: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data_path = temp_dir.path().join("output.json");
        fs::write(&data_path, data).unwrap();
        Self {
            temp_dir,
            data_path,
        }
    }

    /// Command bound to the test dataset
    fn cmd(&self) -> AssertCommand {
        let mut cmd = self.bare_cmd();
        cmd.args(["--source", self.data_path.to_str().unwrap()]);
        cmd
    }

    /// Command with no `--source`
    fn bare_cmd(&self) -> AssertCommand {
        let mut cmd = AssertCommand::cargo_bin("kotoba").unwrap();
        cmd.env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join(".config"))
            .env_remove("RUST_LOG")
            .env_remove("KOTOBA_LOG_FILE");
        cmd
    }

    fn write_config(&self, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }
}

fn stdout_of(cmd: &mut AssertCommand) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_query_text_matches_name_and_tags() {
    let env = TestEnv::new();
    let out = stdout_of(env.cmd().args(["query", "fleur"]));

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "1 result found.");
    assert_eq!(
        lines[1],
        "Sakura\tFleur de cerisier\tfleur, printemps\tdetails.html?word=Sakura"
    );
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_query_without_filters_lists_named_entries() {
    let env = TestEnv::new();
    let out = stdout_of(env.cmd().arg("query"));
    assert!(out.starts_with("6 results found."));
    assert!(!out.contains("sans nom"));
}

#[test]
fn test_query_letter_ignores_diacritics() {
    let env = TestEnv::new();
    let out = stdout_of(env.cmd().args(["query", "--letter", "e"]));
    let names: Vec<&str> = out
        .lines()
        .skip(1)
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(names, vec!["Été", "Ete"]);
}

#[test]
fn test_query_letter_and_text_intersect() {
    let env = TestEnv::new();
    env.cmd()
        .args(["query", "nature", "--letter", "S"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 result found.\nSora\t"));

    env.cmd()
        .args(["query", "nature", "--letter", "A"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0 results found.\n"));
}

#[test]
fn test_query_is_literal() {
    let env = TestEnv::new();
    env.cmd()
        .args(["query", "a+b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a+b corp\t"));

    env.cmd()
        .args(["query", "("])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0 results found."));
}

#[test]
fn test_query_rejects_non_letter() {
    let env = TestEnv::new();
    env.cmd()
        .args(["query", "--letter", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--letter expects a letter"));
}

#[test]
fn test_query_json_output() {
    let env = TestEnv::new();
    let out = stdout_of(env.cmd().args(["query", "SAI", "--format", "json"]));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["count"], 1);
    assert_eq!(value["summary"], "1 result found.");
    let result = &value["results"][0];
    assert_eq!(result["name"], "Été");
    assert_eq!(result["tags"][0], "saison");
    assert_eq!(result["details_url"], "details.html?word=%C3%89t%C3%A9");
}

#[test]
fn test_query_html_escapes_and_highlights() {
    let env = TestEnv::new();
    let out = stdout_of(env.cmd().args(["query", "aut", "--format", "html"]));

    assert!(out.contains("<p class=\"summary\">1 result found.</p>"));
    assert!(out.contains("<h3><mark class=\"highlight\">Aut</mark>re</h3>"));
    assert!(out.contains("<p>&lt;b&gt;gras&lt;/b&gt; &amp; co</p>"));
    assert!(!out.contains("<b>gras"));
}

#[test]
fn test_query_html_empty_state() {
    let env = TestEnv::new();
    env.cmd()
        .args(["query", "zzz", "--format", "html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id=\"no-results\""));
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_default_source_is_output_json_in_working_dir() {
    let env = TestEnv::new();
    env.bare_cmd()
        .current_dir(env.temp_dir.path())
        .args(["query", "sora"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 result found.\nSora\t"));
}

#[test]
fn test_wrapped_array_shapes() {
    let env = TestEnv::with_data(r#"{"data": [{"Nom": "Kaze"}], "meta": {"v": 1}}"#);
    env.cmd()
        .args(["query", "kaze"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 result found.\nKaze\t"));

    let env = TestEnv::with_data(r#"{"version": 2, "words": [{"Nom": "Yuki"}, {"Nom": "Ame"}]}"#);
    env.cmd()
        .arg("query")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2 results found."));
}

#[test]
fn test_missing_source_fails() {
    let env = TestEnv::new();
    env.bare_cmd()
        .args(["--source", "/nonexistent/kotoba/output.json", "query", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to load /nonexistent/kotoba/output.json",
        ));
}

#[test]
fn test_document_without_array_fails() {
    let env = TestEnv::with_data(r#"{"meta": {"v": 1}}"#);
    env.cmd()
        .args(["query", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not contain an array"));
}

#[test]
fn test_malformed_json_fails() {
    let env = TestEnv::with_data("{ not json");
    env.cmd()
        .arg("query")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid JSON"));
}

// =============================================================================
// Sample Tests
// =============================================================================

#[test]
fn test_sample_is_reproducible_with_seed() {
    let env = TestEnv::new();
    let first = stdout_of(env.cmd().args(["--seed", "42", "sample", "--count", "3"]));
    let second = stdout_of(env.cmd().args(["sample", "--count", "3", "--seed", "42"]));

    assert_eq!(first, second);
    assert!(first.starts_with("Showing 3 random entries out of 7."));
    assert_eq!(first.lines().count(), 4);
    assert!(!first.contains("sans nom"));
}

#[test]
fn test_sample_caps_at_named_entries() {
    let env = TestEnv::new();
    let out = stdout_of(env.cmd().args(["--seed", "1", "sample", "--count", "50"]));
    assert!(out.starts_with("Showing 6 random entries out of 7."));
}

#[test]
fn test_sample_rejects_zero() {
    let env = TestEnv::new();
    env.cmd()
        .args(["sample", "--count", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_fields_and_details_url() {
    let env = TestEnv::with_data(r#"[{"word": "Kumo", "labels": "ciel"}]"#);
    let config = env.write_config(
        r#"
details_url = "https://example.com/details.html"

[fields]
name = ["word"]
tags = "labels"
"#,
    );

    env.cmd()
        .args(["--config", config.to_str().unwrap(), "query", "ciel"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Kumo\t \tciel\thttps://example.com/details.html?word=Kumo",
        ));
}

#[test]
fn test_config_sample_size_default() {
    let env = TestEnv::new();
    let config = env.write_config("sample_size = 2\n");

    env.cmd()
        .args(["--config", config.to_str().unwrap(), "--seed", "9", "sample"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Showing 2 random entries"));
}

#[test]
fn test_explicit_config_must_exist() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--config", "/nonexistent/kotoba.toml", "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_config_key_collision_fails() {
    let env = TestEnv::new();
    let config = env.write_config("[keys.results]\nopen = \"j\"\n");

    env.cmd()
        .args(["--config", config.to_str().unwrap(), "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key binding collision"));
}

#[test]
fn test_unknown_config_key_warns() {
    let env = TestEnv::new();
    let config = env.write_config("colour = \"red\"\n");

    env.cmd()
        .args(["--config", config.to_str().unwrap(), "query"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown configuration key `colour`"));
}
