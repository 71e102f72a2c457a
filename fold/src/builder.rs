use crate::error::BuildError;
use crate::Container;

/// A builder for creating `Container` instances with non-default settings.
///
/// ```
/// use fibre_fold::Container;
///
/// let container = Container::builder()
///   .max_alias_depth(4)
///   .capacity(64)
///   .build()
///   .unwrap();
/// assert!(container.bindings().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
  max_alias_depth: usize,
  capacity: usize,
}

impl Default for ContainerBuilder {
  fn default() -> Self {
    Self {
      max_alias_depth: Self::DEFAULT_MAX_ALIAS_DEPTH,
      capacity: 0,
    }
  }
}

impl ContainerBuilder {
  /// How many alias hops `resolve` follows before giving up.
  pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 10;

  pub fn new() -> Self {
    Self::default()
  }

  /// Sets how many alias hops are followed before `AliasCycle` is reported.
  pub fn max_alias_depth(mut self, depth: usize) -> Self {
    self.max_alias_depth = depth;
    self
  }

  /// Pre-sizes the binding table.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  pub fn build(self) -> Result<Container, BuildError> {
    if self.max_alias_depth == 0 {
      return Err(BuildError::ZeroAliasDepth);
    }
    Ok(Container::from_parts(self.max_alias_depth, self.capacity))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_alias_depth_is_rejected() {
    let err = ContainerBuilder::new().max_alias_depth(0).build().unwrap_err();
    assert_eq!(err, BuildError::ZeroAliasDepth);
  }
}
