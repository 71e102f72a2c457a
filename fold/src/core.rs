//! Core, non-public resolution bookkeeping for the container.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// A resolved value. Singletons hand out clones of the same `Arc`.
pub type Instance = Arc<dyn Any + Send + Sync>;

thread_local! {
  // Keys currently under construction on this thread, outermost first.
  // Recipes run synchronously on the resolving thread, so this is exactly the
  // chain of the top-level `resolve` call in progress.
  static RESOLVING_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard that detects circular dependencies.
///
/// Creating the guard pushes a key onto the thread-local resolution stack, or
/// fails with `CircularDependency` if the key is already on it. Dropping the
/// guard pops the key again, whether resolution succeeded, failed or panicked.
pub(crate) struct ResolutionGuard {
  depth: usize,
}

impl ResolutionGuard {
  pub(crate) fn enter(key: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|k| k == key) {
        let mut cycle: Vec<String> = stack[start..].to_vec();
        cycle.push(key.to_owned());
        tracing::warn!(cycle = ?cycle, "circular dependency detected");
        return Err(Error::CircularDependency(cycle));
      }
      stack.push(key.to_owned());
      Ok(Self { depth: stack.len() })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().truncate(self.depth - 1);
    });
  }
}

/// Joins this thread's resolution stack to a chain of keys held by other
/// threads. `waits` starts with the key on top of the stack and ends with a key
/// this thread is already constructing.
fn cycle_across_threads(waits: &[String]) -> Vec<String> {
  RESOLVING_STACK.with(|stack| {
    let stack = stack.borrow();
    let closing = waits.last().map(String::as_str).unwrap_or_default();
    let start = stack.iter().position(|k| k == closing).unwrap_or(0);
    let mut cycle = stack[start..].to_vec();
    cycle.extend(waits.iter().skip(1).cloned());
    cycle
  })
}

#[derive(Debug, Default)]
struct WaitGraph {
  // Singleton key -> thread running its recipe.
  builders: HashMap<String, ThreadId>,
  // Blocked thread -> singleton key it waits for.
  waiting: HashMap<ThreadId, String>,
}

impl WaitGraph {
  /// Follows owner and waits-for edges from `key`. Returns the keys visited if
  /// the walk comes back to `me`.
  fn path_back_to(&self, key: &str, me: ThreadId) -> Option<Vec<String>> {
    let mut path = vec![key.to_owned()];
    let mut owner = *self.builders.get(key)?;
    while owner != me {
      let next = self.waiting.get(&owner)?;
      path.push(next.clone());
      owner = *self.builders.get(next)?;
      if path.len() > self.builders.len() + 1 {
        return None;
      }
    }
    Some(path)
  }
}

/// The outcome of claiming a singleton for construction.
pub(crate) enum Claim<'a> {
  /// Another thread finished it while we waited.
  Ready(Instance),
  /// The calling thread now owns construction until the ticket drops.
  Build(BuildTicket<'a>),
}

/// Serializes singleton construction per key across threads.
///
/// A thread that finds the key being built elsewhere blocks until it settles,
/// unless blocking would close a loop of threads each waiting on a key another
/// one is building. That wait fails with `CircularDependency` instead.
#[derive(Debug, Default)]
pub(crate) struct Constructions {
  graph: Mutex<WaitGraph>,
  settled: Condvar,
}

impl Constructions {
  /// Waits until `key` is either published, as reported by `ready`, or free for
  /// the calling thread to build.
  pub(crate) fn claim(
    &self,
    key: &str,
    ready: impl Fn() -> Option<Instance>,
  ) -> Result<Claim<'_>> {
    let me = thread::current().id();
    let mut graph = self.graph.lock();
    loop {
      if let Some(value) = ready() {
        return Ok(Claim::Ready(value));
      }
      if !graph.builders.contains_key(key) {
        graph.builders.insert(key.to_owned(), me);
        return Ok(Claim::Build(BuildTicket {
          constructions: self,
          key: key.to_owned(),
          owner: me,
        }));
      }
      if let Some(waits) = graph.path_back_to(key, me) {
        let cycle = cycle_across_threads(&waits);
        tracing::warn!(cycle = ?cycle, "circular dependency detected across threads");
        return Err(Error::CircularDependency(cycle));
      }
      graph.waiting.insert(me, key.to_owned());
      self.settled.wait(&mut graph);
      graph.waiting.remove(&me);
    }
  }
}

/// Releases a construction claim and wakes waiting threads, whether the recipe
/// succeeded, failed or panicked. Publish the value before dropping it.
pub(crate) struct BuildTicket<'a> {
  constructions: &'a Constructions,
  key: String,
  owner: ThreadId,
}

impl Drop for BuildTicket<'_> {
  fn drop(&mut self) {
    let mut graph = self.constructions.graph.lock();
    if graph.builders.get(&self.key) == Some(&self.owner) {
      graph.builders.remove(&self.key);
    }
    drop(graph);
    self.constructions.settled.notify_all();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stack_len() -> usize {
    RESOLVING_STACK.with(|stack| stack.borrow().len())
  }

  #[test]
  fn guard_pops_on_drop() {
    {
      let _a = ResolutionGuard::enter("a").unwrap();
      let _b = ResolutionGuard::enter("b").unwrap();
      assert_eq!(stack_len(), 2);
    }
    assert_eq!(stack_len(), 0);
  }

  #[test]
  fn reentering_reports_the_cycle_from_its_first_occurrence() {
    let _root = ResolutionGuard::enter("root").unwrap();
    let _a = ResolutionGuard::enter("a").unwrap();
    let _b = ResolutionGuard::enter("b").unwrap();

    match ResolutionGuard::enter("a") {
      Err(Error::CircularDependency(cycle)) => assert_eq!(cycle, vec!["a", "b", "a"]),
      Err(other) => panic!("unexpected error: {other}"),
      Ok(_) => panic!("cycle was not detected"),
    }
    // The failed attempt must not have pushed anything.
    assert_eq!(stack_len(), 3);
  }

  #[test]
  fn wait_graph_finds_a_loop_through_other_threads() {
    let me = thread::current().id();
    let other = thread::spawn(|| thread::current().id()).join().unwrap();
    let mut graph = WaitGraph::default();
    graph.builders.insert("x".into(), me);
    graph.builders.insert("y".into(), other);
    graph.waiting.insert(other, "x".into());

    assert_eq!(graph.path_back_to("y", me), Some(vec!["y".to_string(), "x".to_string()]));
    graph.waiting.clear();
    assert_eq!(graph.path_back_to("y", me), None);
  }

  #[test]
  fn ticket_release_frees_the_key() {
    let constructions = Constructions::default();
    match constructions.claim("k", || None).unwrap() {
      Claim::Build(ticket) => drop(ticket),
      Claim::Ready(_) => panic!("nothing was published"),
    }
    assert!(matches!(constructions.claim("k", || None), Ok(Claim::Build(_))));
  }
}
