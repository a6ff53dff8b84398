//! End-to-end tests for the subcommand handlers over files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use ijs_cli::check::{run_check, CheckArgs};
use ijs_cli::engine::EngineArgs;
use ijs_cli::realize::{run_merge, run_realize, MergeArgs, RealizeArgs};
use ijs_cli::validate::{run_validate, ValidateArgs};
use ijs_schema::SchemaEngine;
use serde_json::{json, Value};
use tempfile::TempDir;

const USER_SCHEMA: &str = "\
name: string
age: number
role:
  __raw: true
  enum: [admin, member]
tags: [string]
__options:
  title: User
  notRequired: [tags]
";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[test]
fn check_prints_normalized_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let engine = SchemaEngine::new();
    let mut out = Vec::new();

    let code = run_check(&CheckArgs { schema }, &engine, &mut out).unwrap();
    assert_eq!(code, 0);

    let printed: Value = serde_json::from_str(&output(out)).unwrap();
    assert_eq!(printed["__raw"], json!(true));
    assert_eq!(printed["type"], json!("object"));
    assert_eq!(printed["properties"]["role"]["enum"], json!(["admin", "member"]));
    assert_eq!(printed["title"], json!("User"));
    assert_eq!(printed["required"], json!(["name", "age", "role"]));

    let recompiled = engine.compile(printed).unwrap();
    assert_eq!(recompiled.as_object().unwrap().required(), ["name", "age", "role"]);
}

#[test]
fn check_reports_malformed_definition_as_error() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "bad.json", r#"{"a": "nonsense"}"#);
    let mut out = Vec::new();
    let err = run_check(&CheckArgs { schema }, &SchemaEngine::new(), &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("failed to compile schema"));
}

#[test]
fn validate_accepts_conforming_documents() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let alice = write(dir.path(), "alice.json", r#"{"name": "alice", "age": 30, "role": "admin"}"#);
    let bob = write(dir.path(), "bob.yaml", "name: bob\nage: 41\nrole: member\ntags: [ops]\n");
    let mut out = Vec::new();

    let args = ValidateArgs {
        schema,
        documents: vec![alice, bob],
    };
    assert_eq!(run_validate(&args, &SchemaEngine::new(), &mut out).unwrap(), 0);
    let out = output(out);
    assert_eq!(out.lines().filter(|l| l.starts_with("OK: ")).count(), 2);
}

#[test]
fn validate_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let bad = write(dir.path(), "bad.json", r#"{"name": "eve", "age": "old", "role": "admin"}"#);
    let good = write(dir.path(), "good.json", r#"{"name": "g", "age": 1, "role": "member"}"#);
    let mut out = Vec::new();

    let args = ValidateArgs {
        schema,
        documents: vec![bad, good],
    };
    assert_eq!(run_validate(&args, &SchemaEngine::new(), &mut out).unwrap(), 1);
    let out = output(out);
    assert!(out.starts_with("FAIL: "));
    assert!(out.contains(r#"Path: "age"; Expected type: "number"; Actual value: "old""#));
    assert!(!out.contains("good.json"));
}

#[test]
fn validate_missing_document_is_an_error() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let args = ValidateArgs {
        schema,
        documents: vec![dir.path().join("absent.json")],
    };
    let err = run_validate(&args, &SchemaEngine::new(), &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read"));
}

#[test]
fn realize_drops_undeclared_properties() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let document = write(
        dir.path(),
        "alice.json",
        r#"{"name": "alice", "age": 30, "role": "admin", "tags": ["x"], "extra": 1}"#,
    );
    let mut out = Vec::new();

    let args = RealizeArgs { schema, document };
    assert_eq!(run_realize(&args, &SchemaEngine::new(), &mut out).unwrap(), 0);
    let printed: Value = serde_json::from_str(&output(out)).unwrap();
    assert_eq!(
        printed,
        json!({"name": "alice", "age": 30, "role": "admin", "tags": ["x"]})
    );
}

#[test]
fn realize_nonconforming_document_exits_one() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let document = write(dir.path(), "bad.json", r#"{"name": "x", "age": 1, "role": "owner"}"#);
    let mut out = Vec::new();

    let args = RealizeArgs { schema, document };
    assert_eq!(run_realize(&args, &SchemaEngine::new(), &mut out).unwrap(), 1);
    let out = output(out);
    assert!(out.starts_with("FAIL: schema validation failed, schema: (User)"));
    assert!(out.contains("Expected enum of"));
}

#[test]
fn merge_overlays_patch() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let document = write(dir.path(), "alice.json", r#"{"name": "alice", "age": 30, "role": "admin"}"#);
    let patch = write(dir.path(), "patch.json", r#"{"age": 31}"#);
    let mut out = Vec::new();

    let args = MergeArgs {
        schema,
        document,
        patch,
    };
    assert_eq!(run_merge(&args, &SchemaEngine::new(), &mut out).unwrap(), 0);
    let printed: Value = serde_json::from_str(&output(out)).unwrap();
    assert_eq!(printed["age"], json!(31));
    assert_eq!(printed["name"], json!("alice"));
}

#[test]
fn merge_invalid_patch_exits_one() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let document = write(dir.path(), "alice.json", r#"{"name": "alice", "age": 30, "role": "admin"}"#);
    let patch = write(dir.path(), "patch.json", r#"{"role": "root"}"#);
    let mut out = Vec::new();

    let args = MergeArgs {
        schema,
        document,
        patch,
    };
    assert_eq!(run_merge(&args, &SchemaEngine::new(), &mut out).unwrap(), 1);
    assert!(output(out).contains(r#"Path: "role""#));
}

#[test]
fn merge_patch_must_be_object() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "user.yaml", USER_SCHEMA);
    let document = write(dir.path(), "alice.json", r#"{"name": "alice", "age": 30, "role": "admin"}"#);
    let patch = write(dir.path(), "patch.json", "[1, 2]");

    let args = MergeArgs {
        schema,
        document,
        patch,
    };
    let err = run_merge(&args, &SchemaEngine::new(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("must be a JSON object"));
}

#[test]
fn engine_flags_change_required_inference() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "loose.json", r#"{"a": "number", "b": "string"}"#);
    let document = write(dir.path(), "doc.json", r#"{"a": 1}"#);

    let strict = EngineArgs::default().build_engine().unwrap();
    let args = ValidateArgs {
        schema: schema.clone(),
        documents: vec![document.clone()],
    };
    assert_eq!(run_validate(&args, &strict, &mut Vec::new()).unwrap(), 1);

    let loose = EngineArgs {
        no_default_required: true,
        ..EngineArgs::default()
    }
    .build_engine()
    .unwrap();
    assert_eq!(run_validate(&args, &loose, &mut Vec::new()).unwrap(), 0);
}
