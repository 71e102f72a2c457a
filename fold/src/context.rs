//! Lazily computed, per-instance properties for a shared context type.
//!
//! An [`Extensions`] registry collects named getters contributed by any number
//! of independent collaborators. Every [`Context`] created from it exposes
//! those getters by name; cached getters are computed at most once per
//! context, uncached ones on every access.

use crate::core::Instance;
use crate::error::{BoxError, Error, Result};
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::thread::{self, ThreadId};

type Factory<S> = Arc<dyn Fn(&Context<S>) -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// A registered getter.
pub(crate) struct GetterSpec<S> {
  factory: Factory<S>,
  cached: bool,
}

/// The getters defined for contexts over request state `S`.
pub struct Extensions<S> {
  getters: DashMap<String, Arc<GetterSpec<S>>>,
}

impl<S> Default for Extensions<S> {
  fn default() -> Self {
    Self {
      getters: DashMap::new(),
    }
  }
}

impl<S> fmt::Debug for Extensions<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut names: Vec<String> = self.getters.iter().map(|e| e.key().clone()).collect();
    names.sort_unstable();
    f.debug_struct("Extensions").field("getters", &names).finish()
  }
}

impl<S: Send + Sync + 'static> Extensions<S> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Defines the getter `name`, replacing any previous definition.
  ///
  /// The factory receives the context being accessed. With `cached` set, it
  /// runs at most once per context (failures are retried on a later access).
  pub fn define<T, F>(&self, name: impl Into<String>, factory: F, cached: bool)
  where
    T: Any + Send + Sync,
    F: Fn(&Context<S>) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    let name = name.into();
    let factory = move |ctx: &Context<S>| factory(ctx).map(|value| Arc::new(value) as Instance);
    let spec = GetterSpec {
      factory: Arc::new(factory),
      cached,
    };
    if self.getters.insert(name.clone(), Arc::new(spec)).is_some() {
      tracing::debug!(getter = %name, "overriding context getter");
    }
  }

  pub fn is_defined(&self, name: &str) -> bool {
    self.getters.contains_key(name)
  }

  /// Returns whether `name` is memoized, or `None` if it is not defined.
  pub fn is_cached(&self, name: &str) -> Option<bool> {
    self.getters.get(name).map(|spec| spec.cached)
  }

  /// Creates a context over `state` that sees these getters.
  pub fn context(self: &Arc<Self>, state: S) -> Context<S> {
    Context::new(self.clone(), state)
  }

  fn spec(&self, name: &str) -> Option<Arc<GetterSpec<S>>> {
    self.getters.get(name).map(|spec| spec.value().clone())
  }
}

enum SlotState {
  Vacant,
  Computing(ThreadId),
  Ready(Instance),
}

/// The memo for one cached getter on one context.
struct Slot {
  state: Mutex<SlotState>,
  settled: Condvar,
}

impl Slot {
  fn new() -> Self {
    Self {
      state: Mutex::new(SlotState::Vacant),
      settled: Condvar::new(),
    }
  }
}

/// Reverts a slot to `Vacant` unless the computation it guards completed.
/// Covers both a failed factory and one that panicked.
struct ComputeGuard<'a> {
  slot: &'a Slot,
  done: bool,
}

impl ComputeGuard<'_> {
  fn complete(mut self, value: Instance) {
    *self.slot.state.lock() = SlotState::Ready(value);
    self.done = true;
  }
}

impl Drop for ComputeGuard<'_> {
  fn drop(&mut self) {
    if !self.done {
      *self.slot.state.lock() = SlotState::Vacant;
    }
    self.slot.settled.notify_all();
  }
}

/// A per-request context carrying state `S` and the lazily computed getters
/// of its `Extensions`.
///
/// A context is meant to be created for one request and dropped with it. It
/// may still be shared between threads working on that request: a cached
/// getter accessed concurrently is computed once and every caller sees the
/// same value.
pub struct Context<S> {
  state: S,
  extensions: Arc<Extensions<S>>,
  memo: Mutex<HashMap<String, Arc<Slot>>>,
}

impl<S: Send + Sync + 'static> Context<S> {
  pub fn new(extensions: Arc<Extensions<S>>, state: S) -> Self {
    Self {
      state,
      extensions,
      memo: Mutex::new(HashMap::new()),
    }
  }

  pub fn state(&self) -> &S {
    &self.state
  }

  pub fn extensions(&self) -> &Arc<Extensions<S>> {
    &self.extensions
  }

  /// Returns the value of getter `name`.
  pub fn get(&self, name: &str) -> Result<Instance> {
    let spec = self
      .extensions
      .spec(name)
      .ok_or_else(|| Error::UnknownGetter(name.to_owned()))?;

    if spec.cached {
      self.materialize(name, &spec)
    } else {
      self.invoke(name, &spec)
    }
  }

  /// Returns the value of getter `name` downcast to `T`.
  pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.get(name)?.downcast::<T>().map_err(|_| Error::TypeMismatch {
      key: name.to_owned(),
      expected: std::any::type_name::<T>(),
    })
  }

  /// Returns `true` if the cached getter `name` already holds a value here.
  pub fn is_memoized(&self, name: &str) -> bool {
    let slot = self.memo.lock().get(name).cloned();
    slot.is_some_and(|slot| matches!(*slot.state.lock(), SlotState::Ready(_)))
  }

  fn invoke(&self, name: &str, spec: &GetterSpec<S>) -> Result<Instance> {
    (spec.factory)(self).map_err(|cause| Error::ContextGetter {
      name: name.to_owned(),
      cause,
    })
  }

  fn materialize(&self, name: &str, spec: &GetterSpec<S>) -> Result<Instance> {
    let slot = self
      .memo
      .lock()
      .entry(name.to_owned())
      .or_insert_with(|| Arc::new(Slot::new()))
      .clone();

    let me = thread::current().id();
    let mut state = slot.state.lock();
    loop {
      match &*state {
        SlotState::Ready(value) => return Ok(value.clone()),
        SlotState::Computing(owner) if *owner == me => {
          return Err(Error::RecursiveGetter(name.to_owned()));
        }
        SlotState::Computing(_) => {}
        SlotState::Vacant => break,
      }
      slot.settled.wait(&mut state);
    }
    *state = SlotState::Computing(me);
    drop(state);

    let guard = ComputeGuard {
      slot: &slot,
      done: false,
    };
    tracing::trace!(getter = name, "materializing context getter");
    let value = self.invoke(name, spec)?;
    guard.complete(value.clone());
    Ok(value)
  }
}

impl<S> Deref for Context<S> {
  type Target = S;

  fn deref(&self) -> &S {
    &self.state
  }
}

impl<S: fmt::Debug> fmt::Debug for Context<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[test]
  fn recursive_cached_getter_fails_instead_of_deadlocking() {
    let ext = Arc::new(Extensions::<()>::new());
    ext.define(
      "loop",
      |ctx: &Context<()>| {
        ctx.get("loop")?;
        Ok(0u8)
      },
      true,
    );

    let ctx = ext.context(());
    let err = ctx.get("loop").unwrap_err();
    match err {
      Error::ContextGetter { name, cause } => {
        assert_eq!(name, "loop");
        assert!(matches!(
          cause.downcast_ref::<Error>(),
          Some(Error::RecursiveGetter(inner)) if inner == "loop"
        ));
      }
      other => panic!("unexpected error: {other}"),
    }
    // The slot was released, so the getter is not wedged.
    assert!(!ctx.is_memoized("loop"));
  }

  #[test]
  fn panicking_factory_releases_the_slot() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let ext = Arc::new(Extensions::<()>::new());
    ext.define(
      "flaky",
      |_: &Context<()>| {
        if CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
          panic!("first call panics");
        }
        Ok(7u32)
      },
      true,
    );

    let ctx = ext.context(());
    let first = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| ctx.get("flaky")));
    assert!(first.is_err());

    assert_eq!(*ctx.get_as::<u32>("flaky").unwrap(), 7);
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);
  }
}
