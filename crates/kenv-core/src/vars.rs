//! Variable store and variable file readers
//!
//! Two file formats are understood:
//! - `key=value` lines (`.env` and anything not recognised below)
//! - flat YAML/JSON mappings (`.yml`, `.yaml`, `.json`)
//!
//! Mapping files are read in sorted key order so that output is stable
//! across runs.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use k8s_openapi::api::core::v1::EnvVar;
use serde_yaml::Value as YamlValue;

use crate::error::{CoreError, Result};

/// A single key/value variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub key: String,
    pub value: String,
}

impl Var {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered variables with unique keys
///
/// Insertion order is preserved. Re-inserting an existing key replaces its
/// value but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarStore {
    vars: IndexMap<String, String>,
}

impl VarStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Read variable files in order; later files override earlier keys
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut store = VarStore::new();
        for path in paths {
            store.extend(read_vars_file(path.as_ref())?);
        }
        Ok(store)
    }

    /// Read a single variable file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(read_vars_file(path.as_ref())?.into_iter().collect())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate `(key, value)` pairs in store order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Literal-value environment variables in store order
    pub fn to_env_vars(&self) -> Vec<EnvVar> {
        self.iter()
            .map(|(key, value)| EnvVar {
                name: key.to_string(),
                value: Some(value.to_string()),
                ..Default::default()
            })
            .collect()
    }
}

impl Extend<Var> for VarStore {
    fn extend<T: IntoIterator<Item = Var>>(&mut self, iter: T) {
        for var in iter {
            self.insert(var.key, var.value);
        }
    }
}

impl FromIterator<Var> for VarStore {
    fn from_iter<T: IntoIterator<Item = Var>>(iter: T) -> Self {
        let mut store = VarStore::new();
        store.extend(iter);
        store
    }
}

fn read_vars_file(path: &Path) -> Result<Vec<Var>> {
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_mapping = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml" | "json")
    );

    tracing::debug!(path = %path.display(), mapping = is_mapping, "reading variables file");

    if is_mapping {
        parse_mapping(&content).map_err(|message| CoreError::VarsFile {
            path: path.to_path_buf(),
            message,
        })
    } else {
        Ok(parse_kv(&content))
    }
}

/// Parse `key=value` lines
///
/// The value is everything after the first `=`. Blank lines and `#` comments
/// are ignored; malformed lines are skipped with a warning.
pub fn parse_kv(content: &str) -> Vec<Var> {
    let mut vars = Vec::new();

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) if !key.is_empty() => vars.push(Var::new(key, value)),
            _ => tracing::warn!("Skipping {}; not in key=value format", line),
        }
    }

    vars
}

/// Parse a flat `key: value` mapping, returning keys in sorted order
pub fn parse_mapping(content: &str) -> std::result::Result<Vec<Var>, String> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mapping: BTreeMap<String, YamlValue> =
        serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    mapping
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                YamlValue::String(s) => s,
                YamlValue::Number(n) => n.to_string(),
                YamlValue::Bool(b) => b.to_string(),
                YamlValue::Null => String::new(),
                _ => return Err(format!("value of '{}' is not a scalar", key)),
            };
            Ok(Var { key, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_kv() {
        let vars = parse_kv("KVKey1=KVValue1\nkvkey2=kvvalue2\n");
        assert_eq!(
            vars,
            vec![Var::new("KVKey1", "KVValue1"), Var::new("kvkey2", "kvvalue2")]
        );
    }

    #[test]
    fn test_parse_kv_value_keeps_separators() {
        let vars = parse_kv("DSN=postgres://u:p@h/db?sslmode=disable");
        assert_eq!(vars[0].key, "DSN");
        assert_eq!(vars[0].value, "postgres://u:p@h/db?sslmode=disable");
    }

    #[test]
    fn test_parse_kv_skips_blank_comment_and_malformed_lines() {
        let vars = parse_kv("\n# comment\nnot a pair\n=nokey\nA=1\r\n\nB=\n");
        assert_eq!(vars, vec![Var::new("A", "1"), Var::new("B", "")]);
    }

    #[test]
    fn test_parse_mapping_sorted() {
        let vars = parse_mapping("zeta: last\nalpha: first\nport: 8080\ndebug: true\n").unwrap();
        let keys: Vec<_> = vars.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "debug", "port", "zeta"]);
        assert_eq!(vars[2].value, "8080");
        assert_eq!(vars[1].value, "true");
    }

    #[test]
    fn test_parse_mapping_json() {
        let vars = parse_mapping(r#"{"B": "2", "A": "1"}"#).unwrap();
        assert_eq!(vars, vec![Var::new("A", "1"), Var::new("B", "2")]);
    }

    #[test]
    fn test_parse_mapping_rejects_nested() {
        let err = parse_mapping("outer:\n  inner: value\n").unwrap_err();
        assert!(err.contains("outer"));
    }

    #[test]
    fn test_store_later_duplicates_overwrite_in_place() {
        let mut store = VarStore::new();
        store.insert("A", "1");
        store.insert("B", "2");
        store.insert("A", "3");

        let pairs: Vec<_> = store.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_to_env_vars() {
        let store: VarStore = vec![Var::new("KVKey1", "KVValue1"), Var::new("kvkey2", "kvvalue2")]
            .into_iter()
            .collect();

        let env = store.to_env_vars();
        assert_eq!(env.len(), 2);
        assert_eq!(env[0].name, "KVKey1");
        assert_eq!(env[0].value.as_deref(), Some("KVValue1"));
        assert!(env[0].value_from.is_none());
        assert_eq!(env[1].name, "kvkey2");
    }

    #[test]
    fn test_from_files_in_order() {
        let dir = TempDir::new().unwrap();
        let env_file = dir.path().join("vars.env");
        let yaml_file = dir.path().join("vars.yaml");
        fs::write(&env_file, "KVKey1=KVValue1\nkvkey2=kvvalue2\n").unwrap();
        fs::write(&yaml_file, "yamlkey2: yamlvalue2\nYAMLKey1: YAMLValue1\n").unwrap();

        let store = VarStore::from_files(&[&env_file, &yaml_file]).unwrap();
        let keys: Vec<_> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["KVKey1", "kvkey2", "YAMLKey1", "yamlkey2"]);
    }

    #[test]
    fn test_from_files_later_file_wins() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.env");
        let second = dir.path().join("second.env");
        fs::write(&first, "A=1\nB=2\n").unwrap();
        fs::write(&second, "A=override\n").unwrap();

        let store = VarStore::from_files(&[&first, &second]).unwrap();
        assert_eq!(store.get("A"), Some("override"));
        assert_eq!(store.iter().next(), Some(("A", "override")));
    }

    #[test]
    fn test_from_file_missing() {
        let err = VarStore::from_file("/nonexistent/vars.env").unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vars.yaml");
        fs::write(&path, "- just\n- a list\n").unwrap();

        let err = VarStore::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::VarsFile { .. }));
    }
}
