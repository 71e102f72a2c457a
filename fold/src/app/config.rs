use crate::BoxError;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;

/// Application configuration addressed by dotted paths (`"app.http.port"`).
///
/// Each `<name>.json` file in the config directory becomes the top-level
/// section `<name>`.
#[derive(Debug)]
pub struct Config {
  root: RwLock<Value>,
}

impl Default for Config {
  fn default() -> Self {
    Self::from_value(Value::Object(Map::new()))
  }
}

impl Config {
  pub fn from_value(root: Value) -> Self {
    Self {
      root: RwLock::new(root),
    }
  }

  pub fn load(config_dir: &Path) -> Result<Self, BoxError> {
    let entries = match fs::read_dir(config_dir) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
      Err(e) => return Err(e.into()),
    };

    let mut sections = Map::new();
    for entry in entries {
      let path = entry?.path();
      if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        continue;
      }
      let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
        continue;
      };
      let value: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
      sections.insert(name.to_owned(), value);
    }
    tracing::debug!(dir = %config_dir.display(), sections = sections.len(), "loaded config");
    Ok(Self::from_value(Value::Object(sections)))
  }

  pub fn get(&self, path: &str) -> Option<Value> {
    let root = self.root.read();
    path
      .split('.')
      .try_fold(&*root, |node, segment| node.get(segment))
      .cloned()
  }

  pub fn get_or(&self, path: &str, default: Value) -> Value {
    self.get(path).unwrap_or(default)
  }

  /// Sets `path`, creating intermediate objects and replacing non-object
  /// values found on the way.
  pub fn set(&self, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    insert_path(&mut self.root.write(), &segments, value);
  }
}

fn insert_path(node: &mut Value, segments: &[&str], value: Value) {
  let Some((first, rest)) = segments.split_first() else {
    *node = value;
    return;
  };
  if !node.is_object() {
    *node = Value::Object(Map::new());
  }
  if let Value::Object(map) = node {
    let child = map.entry((*first).to_owned()).or_insert(Value::Null);
    insert_path(child, rest, value);
  }
}
