use thiserror::Error;

use crate::provider::Phase;

/// A type-erased error raised by user code: recipes, getter factories and providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for `fibre_fold`.
#[derive(Debug, Error)]
pub enum Error {
  #[error("no binding registered for '{0}'")]
  UnknownBinding(String),

  #[error("alias chain too deep or looping: {}", .0.join(" -> "))]
  AliasCycle(Vec<String>),

  #[error("circular dependency detected: {}", .0.join(" -> "))]
  CircularDependency(Vec<String>),

  #[error("failed to construct '{key}': {cause}")]
  RecipeConstruction {
    key: String,
    #[source]
    cause: BoxError,
  },

  #[error("binding '{key}' does not hold a value of type {expected}")]
  TypeMismatch { key: String, expected: &'static str },

  #[error("provider '{provider}' failed during {phase}: {cause}")]
  ProviderStartup {
    provider: String,
    phase: Phase,
    #[source]
    cause: BoxError,
  },

  #[error("provider lifecycle is {found}, expected {expected}")]
  InvalidPhase { expected: Phase, found: Phase },

  #[error("no context getter defined for '{0}'")]
  UnknownGetter(String),

  #[error("context getter '{0}' was accessed while it was being computed on the same thread")]
  RecursiveGetter(String),

  #[error("context getter '{name}' failed: {cause}")]
  ContextGetter {
    name: String,
    #[source]
    cause: BoxError,
  },
}

impl Error {
  /// Returns `true` if this error, or the container error it wraps, is a
  /// circular dependency.
  pub fn is_circular(&self) -> bool {
    match self {
      Error::CircularDependency(_) => true,
      Error::RecipeConstruction { cause, .. }
      | Error::ProviderStartup { cause, .. }
      | Error::ContextGetter { cause, .. } => cause
        .downcast_ref::<Error>()
        .is_some_and(Error::is_circular),
      _ => false,
    }
  }
}

/// A specialized `Result` type for `fibre_fold` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur when building a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// Alias chains would never resolve with a depth of zero.
  #[error("maximum alias depth cannot be zero")]
  ZeroAliasDepth,
}
