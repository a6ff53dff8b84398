//! # Document Loading
//!
//! Reads schema definitions, data documents and configuration overrides
//! from `.json`, `.yaml` or `.yml` files. Both formats deserialize straight
//! into the order-preserving JSON value model, so object definitions keep
//! their declared property order.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use ijs_schema::{Schema, SchemaDef, SchemaEngine};

/// Load a JSON or YAML document. The format is chosen by extension;
/// anything that is not `.yaml`/`.yml` is read as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if is_yaml(path) {
        serde_yaml::from_str(&content).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Load and compile a schema definition file.
pub fn load_schema(engine: &SchemaEngine, path: &Path) -> Result<Schema> {
    let definition = load_document(path)?;
    let schema = engine
        .compile(SchemaDef::from(definition))
        .with_context(|| format!("failed to compile schema {}", path.display()))?;
    tracing::info!(path = %path.display(), kind = %schema.kind(), "compiled schema");
    Ok(schema)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn yaml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_yaml_mapping_keeps_order() {
        let file = yaml_file("z: string\na: number\nm: [boolean]\n");
        let value = load_document(file.path()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(value["m"], json!(["boolean"]));
    }

    #[test]
    fn test_yaml_float_and_null() {
        let file = yaml_file("x: 1.5\ny: ~\n");
        assert_eq!(load_document(file.path()).unwrap(), json!({"x": 1.5, "y": null}));
    }

    #[test]
    fn test_json_is_default_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"b": "string", "a": "number"}}"#).unwrap();
        let value = load_document(file.path()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_invalid_yaml_names_the_file() {
        let file = yaml_file("a: [unclosed\n");
        let err = load_document(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid YAML"));
    }

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("a.yaml")));
        assert!(is_yaml(Path::new("a.YML")));
        assert!(!is_yaml(Path::new("a.json")));
        assert!(!is_yaml(Path::new("a")));
    }
}
