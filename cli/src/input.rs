//! Step input loading.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Read the input document from `path`, or JSON from stdin when `path` is
/// `None` or `-`. Files ending in `.toml` are parsed as TOML.
///
/// Runs on the blocking pool so signal listeners keep running while stdin is
/// still open.
pub(crate) async fn read_input(path: Option<PathBuf>) -> Result<Value> {
    tokio::task::spawn_blocking(move || load_input(path.as_deref()))
        .await
        .context("input reader task failed")?
}

fn load_input(path: Option<&Path>) -> Result<Value> {
    let path = match path {
        Some(path) if path.as_os_str() != "-" => path,
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read input from stdin")?;
            return parse_json(&raw).context("invalid JSON input on stdin");
        }
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_toml(&raw).with_context(|| format!("invalid TOML input {}", path.display()))
    } else {
        parse_json(&raw).with_context(|| format!("invalid JSON input {}", path.display()))
    }
}

fn parse_json(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        bail!("input is empty");
    }
    Ok(serde_json::from_str(raw)?)
}

fn parse_toml(raw: &str) -> Result<Value> {
    let table: toml::Table = toml::from_str(raw)?;
    let mut map = serde_json::Map::new();
    for (key, value) in &table {
        map.insert(key.clone(), toml_to_json(value).map_err(anyhow::Error::msg)?);
    }
    Ok(Value::Object(map))
}

fn toml_to_json(value: &toml::Value) -> Result<Value, String> {
    match value {
        toml::Value::String(s) => Ok(Value::String(s.clone())),
        toml::Value::Integer(i) => Ok(Value::Number((*i).into())),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| format!("Invalid float: {f}")),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Array(arr) => arr
            .iter()
            .map(toml_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        toml::Value::Table(table) => {
            let mut map = serde_json::Map::new();
            for (k, v) in table {
                map.insert(k.clone(), toml_to_json(v)?);
            }
            Ok(Value::Object(map))
        }
        toml::Value::Datetime(dt) => Ok(Value::String(dt.to_string())),
    }
}
