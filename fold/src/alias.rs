//! Alternate names for binding keys.

use dashmap::DashMap;

/// Maps alias names to the keys they stand for.
///
/// Targets are not validated when an alias is added: providers may alias a
/// key before whichever provider owns it has registered it.
#[derive(Debug, Default)]
pub struct AliasTable {
  aliases: DashMap<String, String>,
}

impl AliasTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alias(&self, name: impl Into<String>, target: impl Into<String>) {
    let name = name.into();
    let target = target.into();
    if let Some(previous) = self.aliases.insert(name.clone(), target.clone()) {
      if previous != target {
        tracing::debug!(alias = %name, %previous, %target, "re-pointing alias");
      }
    }
  }

  /// Resolves one level of aliasing. Unaliased names pass through unchanged.
  pub fn resolve_alias(&self, name: &str) -> String {
    self.target(name).unwrap_or_else(|| name.to_owned())
  }

  pub(crate) fn target(&self, name: &str) -> Option<String> {
    self.aliases.get(name).map(|t| t.value().clone())
  }

  pub fn is_alias(&self, name: &str) -> bool {
    self.aliases.contains_key(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unaliased_names_pass_through() {
    let table = AliasTable::new();
    assert_eq!(table.resolve_alias("Config"), "Config");
  }

  #[test]
  fn alias_may_precede_its_target_and_be_repointed() {
    let table = AliasTable::new();
    table.alias("Config", "Fibre/Src/Config");
    assert_eq!(table.resolve_alias("Config"), "Fibre/Src/Config");

    table.alias("Config", "Test/Config");
    assert_eq!(table.resolve_alias("Config"), "Test/Config");
    assert!(table.is_alias("Config"));
    assert!(!table.is_alias("Test/Config"));
  }
}
