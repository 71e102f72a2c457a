use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Environment variables, read from an optional `.env` file under the
/// application root and then overridden by the process environment.
#[derive(Debug, Default)]
pub struct Env {
  vars: RwLock<HashMap<String, String>>,
}

impl Env {
  pub fn load(app_root: &Path) -> io::Result<Self> {
    let mut vars = match fs::read_to_string(app_root.join(".env")) {
      Ok(contents) => parse_dotenv(&contents),
      Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
      Err(e) => return Err(e),
    };
    vars.extend(std::env::vars());
    Ok(Self {
      vars: RwLock::new(vars),
    })
  }

  pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      vars: RwLock::new(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
    }
  }

  pub fn get(&self, key: &str) -> Option<String> {
    self.vars.read().get(key).cloned()
  }

  pub fn get_or(&self, key: &str, default: &str) -> String {
    self.get(key).unwrap_or_else(|| default.to_owned())
  }

  pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
    self.vars.write().insert(key.into(), value.into());
  }
}

fn parse_dotenv(contents: &str) -> HashMap<String, String> {
  contents
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .filter_map(|line| line.split_once('='))
    .map(|(key, value)| {
      let value = value.trim().trim_matches('"').trim_matches('\'');
      (key.trim().to_owned(), value.to_owned())
    })
    .collect()
}
