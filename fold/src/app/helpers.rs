use crate::app::keys;
use crate::{BoxError, Registrar, ServiceProvider};
use std::path::{Path, PathBuf};

/// Well-known application paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Helpers {
  app_root: PathBuf,
}

impl Helpers {
  pub fn new(app_root: impl Into<PathBuf>) -> Self {
    Self {
      app_root: app_root.into(),
    }
  }

  pub fn app_root(&self) -> &Path {
    &self.app_root
  }

  pub fn config_path(&self) -> PathBuf {
    self.app_root.join("config")
  }

  pub fn public_path(&self) -> PathBuf {
    self.app_root.join("public")
  }
}

/// Registers `Helpers` for the given application root.
#[derive(Debug, Clone)]
pub struct HelpersProvider {
  app_root: PathBuf,
}

impl HelpersProvider {
  pub fn new(app_root: impl Into<PathBuf>) -> Self {
    Self {
      app_root: app_root.into(),
    }
  }
}

impl ServiceProvider for HelpersProvider {
  fn name(&self) -> &str {
    "HelpersProvider"
  }

  fn register(&self, app: &Registrar<'_>) -> Result<(), BoxError> {
    app.instance(keys::HELPERS.name(), Helpers::new(self.app_root.clone()));
    app.alias("Helpers", keys::HELPERS.name());
    Ok(())
  }
}
