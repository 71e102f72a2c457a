use fibre_fold::Container;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() -> fibre_fold::Result<()> {
  let container = Container::new();

  // This recipe will only be called ONCE.
  container.singleton("singleton_tracker", |_: &Container| {
    println!("Creating SINGLETON RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  });

  // This recipe will be called EVERY time the key is resolved.
  container.bind("transient_tracker", |_: &Container| {
    println!("Creating TRANSIENT RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  });
  container.alias("Tracker", "singleton_tracker");

  println!("--- Resolving Singletons ---");
  let s1 = container.resolve_as::<RequestTracker>("singleton_tracker")?;
  let s2 = container.resolve_as::<RequestTracker>("Tracker")?;
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("\n--- Resolving Transients ---");
  let t1 = container.resolve_as::<RequestTracker>("transient_tracker")?;
  let t2 = container.resolve_as::<RequestTracker>("transient_tracker")?;
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_ne!(t1.id, t2.id);

  Ok(())
}
