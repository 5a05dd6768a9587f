//! Reading and writing fixture files.
//!
//! # Design
//! A fixture is identified by its path only; nothing is cached. YAML fixtures
//! are decoded into the same `serde_json::Value` tree as JSON ones so both go
//! through one structural comparison. As a consequence YAML mappings must use
//! string keys.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, TesterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Json,
    Yaml,
}

impl FixtureFormat {
    /// `.yaml` and `.yml` are YAML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                FixtureFormat::Yaml
            }
            _ => FixtureFormat::Json,
        }
    }
}

/// A request payload given inline or as a path to a JSON file.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    Value(Value),
    File(PathBuf),
}

impl JsonBody {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        JsonBody::File(path.into())
    }

    pub fn resolve(&self) -> Result<Value> {
        match self {
            JsonBody::Value(value) => Ok(value.clone()),
            JsonBody::File(path) => load_json(path),
        }
    }
}

impl From<Value> for JsonBody {
    fn from(value: Value) -> Self {
        JsonBody::Value(value)
    }
}

pub fn read_raw(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| TesterError::io(path, e))
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| TesterError::io(path, e))
}

pub fn load_json(path: &Path) -> Result<Value> {
    parse_json(&read_raw(path)?, &path.display().to_string())
}

pub fn load_yaml(path: &Path) -> Result<Value> {
    parse_yaml(&read_raw(path)?, &path.display().to_string())
}

/// Load a fixture according to its extension.
pub fn load(path: &Path) -> Result<Value> {
    match FixtureFormat::from_path(path) {
        FixtureFormat::Json => load_json(path),
        FixtureFormat::Yaml => load_yaml(path),
    }
}

pub(crate) fn parse_json(content: &str, context: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| TesterError::json(context, e))
}

pub(crate) fn parse_yaml(content: &str, context: &str) -> Result<Value> {
    // An empty YAML document is null, as for the YAML parsers fixtures are
    // usually produced with.
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(content).map_err(|e| TesterError::yaml(context, e))
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)
        .map_err(|e| TesterError::json(path.display().to_string(), e))?;
    content.push('\n');
    write_raw(path, content.as_bytes())
}

pub fn write_yaml(path: &Path, value: &Value) -> Result<()> {
    let content =
        serde_yaml::to_string(value).map_err(|e| TesterError::yaml(path.display().to_string(), e))?;
    write_raw(path, content.as_bytes())
}

/// Store a response body into a fixture.
///
/// JSON fixtures get the body pretty-printed when it parses, verbatim
/// otherwise. YAML fixtures require a JSON body and store it re-dumped as YAML.
pub fn write_body(path: &Path, body: &[u8]) -> Result<()> {
    match FixtureFormat::from_path(path) {
        FixtureFormat::Json => match serde_json::from_slice::<Value>(body) {
            Ok(value) => write_json(path, &value),
            Err(_) => write_raw(path, body),
        },
        FixtureFormat::Yaml => {
            let value: Value = serde_json::from_slice(body)
                .map_err(|e| TesterError::json("response body", e))?;
            write_yaml(path, &value)
        }
    }
}

pub fn write_raw(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TesterError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| TesterError::io(path, e))
}
