//! Binding storage: key to recipe mappings tagged with a lifecycle.

use crate::core::Instance;
use crate::error::BoxError;
use std::any::Any;
use crate::Container;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// How often a binding's recipe runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
  /// The recipe runs once; its result is reused for the container's lifetime.
  Singleton,
  /// The recipe runs anew on every resolution.
  Transient,
}

/// A type-erased construction recipe.
pub(crate) type Recipe =
  Arc<dyn Fn(&Container) -> std::result::Result<Instance, BoxError> + Send + Sync>;

fn prebuilt(_: &Container) -> std::result::Result<Instance, BoxError> {
  Err("pre-built instance has no recipe".into())
}

/// A registered recipe for producing the value of a key.
pub struct Binding {
  key: String,
  lifecycle: Lifecycle,
  recipe: Recipe,
  // Only ever populated for `Lifecycle::Singleton`.
  cached: OnceCell<Instance>,
}

impl Binding {
  pub(crate) fn new(key: String, lifecycle: Lifecycle, recipe: Recipe) -> Self {
    Self {
      key,
      lifecycle,
      recipe,
      cached: OnceCell::new(),
    }
  }

  pub(crate) fn with_value(key: String, value: Instance) -> Self {
    Self {
      recipe: Arc::new(prebuilt),
      lifecycle: Lifecycle::Singleton,
      cached: OnceCell::with_value(value),
      key,
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn lifecycle(&self) -> Lifecycle {
    self.lifecycle
  }

  /// Returns `true` once a singleton has been constructed successfully.
  pub fn is_resolved(&self) -> bool {
    self.cached.get().is_some()
  }

  pub(crate) fn cached(&self) -> &OnceCell<Instance> {
    &self.cached
  }

  pub(crate) fn construct(&self, container: &Container) -> std::result::Result<Instance, BoxError> {
    (self.recipe)(container)
  }
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binding")
      .field("key", &self.key)
      .field("lifecycle", &self.lifecycle)
      .field("resolved", &self.is_resolved())
      .finish_non_exhaustive()
  }
}

/// Stores bindings by key. Never constructs values.
#[derive(Debug, Default)]
pub struct BindingRegistry {
  bindings: DashMap<String, Arc<Binding>>,
}

impl BindingRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self {
      bindings: DashMap::with_capacity(capacity),
    }
  }

  /// Stores `recipe` under `key`, replacing any previous binding for it.
  ///
  /// Replacing a singleton discards its cached value.
  pub fn register<T, F>(&self, key: impl Into<String>, lifecycle: Lifecycle, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    let recipe = move |container: &Container| {
      recipe(container).map(|value| Arc::new(value) as Instance)
    };
    self.insert(Binding::new(key.into(), lifecycle, Arc::new(recipe)));
  }

  /// Stores an already constructed singleton under `key`.
  pub fn instance<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
    self.insert(Binding::with_value(key.into(), Arc::new(value)));
  }

  fn insert(&self, binding: Binding) {
    let key = binding.key.clone();
    let lifecycle = binding.lifecycle;
    if let Some(previous) = self.bindings.insert(key.clone(), Arc::new(binding)) {
      tracing::debug!(
        key = %key,
        previous = ?previous.lifecycle,
        current = ?lifecycle,
        "overriding existing binding"
      );
    }
  }

  pub fn has(&self, key: &str) -> bool {
    self.bindings.contains_key(key)
  }

  /// Returns a handle to the binding. The registry lock is not held by the
  /// returned value, so callers may run its recipe freely.
  pub fn get(&self, key: &str) -> Option<Arc<Binding>> {
    self.bindings.get(key).map(|entry| entry.value().clone())
  }

  pub fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.bindings.iter().map(|e| e.key().clone()).collect();
    keys.sort_unstable();
    keys
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }
}
