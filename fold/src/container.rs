//! The main `Container` struct and its associated methods.

use crate::alias::AliasTable;
use crate::binding::{Binding, BindingRegistry, Lifecycle};
use crate::builder::ContainerBuilder;
use crate::core::{Claim, Constructions, Instance, ResolutionGuard};
use crate::error::{BoxError, Error, Result};
use crate::key::Key;
use std::any::Any;
use std::sync::Arc;

/// The binding container.
///
/// Holds string-keyed bindings and aliases, and turns a key into a value by
/// applying the binding's lifecycle. It is thread-safe: registration and
/// resolution take `&self`, so a container is usually shared as
/// `Arc<Container>` by the composition root.
#[derive(Debug)]
pub struct Container {
  bindings: BindingRegistry,
  aliases: AliasTable,
  constructions: Constructions,
  max_alias_depth: usize,
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Container {
  /// Creates a new, empty `Container` with default settings.
  pub fn new() -> Self {
    Self::from_parts(ContainerBuilder::DEFAULT_MAX_ALIAS_DEPTH, 0)
  }

  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::new()
  }

  pub(crate) fn from_parts(max_alias_depth: usize, capacity: usize) -> Self {
    Self {
      bindings: BindingRegistry::with_capacity(capacity),
      aliases: AliasTable::new(),
      constructions: Constructions::default(),
      max_alias_depth,
    }
  }

  // --- Registration ---

  /// Registers a recipe under `key`, replacing any existing binding.
  ///
  /// The recipe receives the container so it can resolve its own dependencies.
  pub fn register<T, F>(&self, key: impl Into<String>, lifecycle: Lifecycle, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    self.bindings.register(key, lifecycle, recipe);
  }

  /// Registers a recipe whose result is constructed once and shared.
  pub fn singleton<T, F>(&self, key: impl Into<String>, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register(key, Lifecycle::Singleton, recipe);
  }

  /// Registers a recipe that runs on every resolution.
  pub fn bind<T, F>(&self, key: impl Into<String>, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register(key, Lifecycle::Transient, recipe);
  }

  /// Registers an already constructed value as a singleton.
  pub fn instance<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
    self.bindings.instance(key, value);
  }

  /// Makes `name` resolve to whatever `target` resolves to.
  pub fn alias(&self, name: impl Into<String>, target: impl Into<String>) {
    self.aliases.alias(name, target);
  }

  // --- Introspection ---

  pub fn bindings(&self) -> &BindingRegistry {
    &self.bindings
  }

  pub fn aliases(&self) -> &AliasTable {
    &self.aliases
  }

  /// Returns `true` if `key`, after alias resolution, has a binding.
  pub fn has(&self, key: &str) -> bool {
    self
      .canonical_key(key)
      .is_ok_and(|canonical| self.bindings.has(&canonical))
  }

  /// Returns `true` if `key` names a singleton that has already been built.
  pub fn is_resolved(&self, key: &str) -> bool {
    self
      .canonical_key(key)
      .ok()
      .and_then(|canonical| self.bindings.get(&canonical))
      .is_some_and(|binding| binding.is_resolved())
  }

  /// Follows the alias chain starting at `name` to the key it stands for.
  pub fn canonical_key(&self, name: &str) -> Result<String> {
    let mut chain = vec![name.to_owned()];
    let mut current = name.to_owned();
    while let Some(target) = self.aliases.target(&current) {
      let looping = chain.contains(&target);
      chain.push(target.clone());
      if looping || chain.len() > self.max_alias_depth + 1 {
        return Err(Error::AliasCycle(chain));
      }
      current = target;
    }
    Ok(current)
  }

  // --- Resolution ---

  /// Resolves `key` to a value.
  ///
  /// Singleton recipes run at most once per registration, even when several
  /// threads resolve the same key for the first time concurrently. A failed
  /// construction is never cached. A cycle is reported as `CircularDependency`
  /// whether it closes on one thread or across threads building singletons.
  pub fn resolve(&self, key: &str) -> Result<Instance> {
    let canonical = self.canonical_key(key)?;
    let binding = self
      .bindings
      .get(&canonical)
      .ok_or_else(|| Error::UnknownBinding(canonical.clone()))?;

    let _guard = ResolutionGuard::enter(&canonical)?;

    match binding.lifecycle() {
      Lifecycle::Singleton => {
        if let Some(value) = binding.cached().get() {
          return Ok(value.clone());
        }
        let ticket = match self
          .constructions
          .claim(&canonical, || binding.cached().get().cloned())?
        {
          Claim::Ready(value) => return Ok(value),
          Claim::Build(ticket) => ticket,
        };
        tracing::debug!(key = %canonical, "constructing singleton");
        let value = self.construct(&binding)?;
        let value = binding.cached().get_or_init(|| value).clone();
        drop(ticket);
        Ok(value)
      }
      Lifecycle::Transient => {
        tracing::trace!(key = %canonical, "constructing transient");
        self.construct(&binding)
      }
    }
  }

  /// Resolves `key` and downcasts the value to `T`.
  pub fn resolve_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
    self
      .resolve(key)?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        key: key.to_owned(),
        expected: std::any::type_name::<T>(),
      })
  }

  /// Resolves a typed key.
  pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<Arc<T>> {
    self
      .resolve(key.name())?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        key: key.name().to_owned(),
        expected: key.type_name(),
      })
  }

  fn construct(&self, binding: &Binding) -> Result<Instance> {
    let wrap = |cause: BoxError| Error::RecipeConstruction {
      key: binding.key().to_owned(),
      cause,
    };
    binding.construct(self).map_err(|cause| match cause.downcast::<Error>() {
      Ok(err) => match *err {
        // Cycles surface unwrapped so the caller sees the whole chain.
        cycle @ Error::CircularDependency(_) => cycle,
        other => wrap(Box::new(other)),
      },
      Err(cause) => wrap(cause),
    })
  }
}
