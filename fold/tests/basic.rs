use fibre_fold::{BindingRegistry, BoxError, Container, Error, Key, Lifecycle};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Test Fixtures ---

// A service tagged with a random identifier at construction.
#[derive(Debug)]
struct Tagged {
  id: u64,
}

fn tagged(_: &Container) -> Result<Tagged, BoxError> {
  Ok(Tagged {
    id: rand::random(),
  })
}

// --- Basic Tests ---

#[test]
fn test_singleton_resolves_to_the_same_instance() {
  // Arrange
  let container = Container::new();
  container.singleton("db", tagged);

  // Act
  let r1 = container.resolve_as::<Tagged>("db").unwrap();
  let r2 = container.resolve_as::<Tagged>("db").unwrap();

  // Assert
  assert_eq!(r1.id, r2.id);
  assert!(Arc::ptr_eq(&r1, &r2));
  assert!(container.is_resolved("db"));
}

#[test]
fn test_transient_resolves_to_fresh_instances() {
  // Arrange
  let calls = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  let counter = calls.clone();
  container.bind("token", move |c: &Container| {
    counter.fetch_add(1, Ordering::SeqCst);
    tagged(c)
  });

  // Act
  let t1 = container.resolve_as::<Tagged>("token").unwrap();
  let t2 = container.resolve_as::<Tagged>("token").unwrap();

  // Assert
  assert_eq!(calls.load(Ordering::SeqCst), 2);
  assert_ne!(t1.id, t2.id);
  assert!(!Arc::ptr_eq(&t1, &t2));
  assert!(!container.is_resolved("token"));
}

#[test]
fn test_alias_follows_the_target_lifecycle() {
  // Arrange
  let container = Container::new();
  container.singleton("db", tagged);
  container.bind("token", tagged);
  container.alias("cache", "db");
  container.alias("nonce", "token");

  // Act
  let via_alias = container.resolve_as::<Tagged>("cache").unwrap();
  let direct = container.resolve_as::<Tagged>("db").unwrap();
  let n1 = container.resolve_as::<Tagged>("nonce").unwrap();
  let n2 = container.resolve_as::<Tagged>("token").unwrap();

  // Assert
  assert_eq!(via_alias.id, direct.id);
  assert!(Arc::ptr_eq(&via_alias, &direct));
  assert!(!Arc::ptr_eq(&n1, &n2));
}

#[test]
fn test_alias_may_be_declared_before_its_target() {
  let container = Container::new();
  container.alias("Config", "app.config");
  assert!(!container.has("Config"));

  container.instance("app.config", String::from("loaded"));

  assert!(container.has("Config"));
  assert_eq!(*container.resolve_as::<String>("Config").unwrap(), "loaded");
}

#[test]
fn test_missing_binding_is_an_error_and_runs_no_recipe() {
  // Arrange
  let calls = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  let counter = calls.clone();
  container.singleton("present", move |_: &Container| {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(())
  });

  // Act
  let err = container.resolve("missing").unwrap_err();

  // Assert
  assert!(matches!(err, Error::UnknownBinding(ref key) if key == "missing"));
  assert_eq!(err.to_string(), "no binding registered for 'missing'");
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_alias_to_missing_target_reports_the_target() {
  let container = Container::new();
  container.alias("Hash", "Fibre/Src/Hash");

  match container.resolve("Hash") {
    Err(Error::UnknownBinding(key)) => assert_eq!(key, "Fibre/Src/Hash"),
    other => panic!("unexpected result: {:?}", other.map(|_| ())),
  }
}

#[test]
fn test_instance_is_a_prebuilt_singleton() {
  let container = Container::new();
  container.instance("greeting", String::from("Hello!"));

  let binding = container.bindings().get("greeting").unwrap();
  assert_eq!(binding.lifecycle(), Lifecycle::Singleton);
  assert!(binding.is_resolved());

  let r1 = container.resolve_as::<String>("greeting").unwrap();
  let r2 = container.resolve_as::<String>("greeting").unwrap();
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_typed_key_resolution_and_type_mismatch() {
  const PORT: Key<u16> = Key::new("http.port");
  const WRONG: Key<String> = Key::new("http.port");

  let container = Container::new();
  container.instance(PORT.name(), 8080u16);

  assert_eq!(*container.get(&PORT).unwrap(), 8080);
  match container.get(&WRONG) {
    Err(Error::TypeMismatch { key, expected }) => {
      assert_eq!(key, "http.port");
      assert!(expected.contains("String"));
    }
    other => panic!("unexpected result: {:?}", other),
  }
}

#[test]
fn test_registry_lookup_does_not_construct() {
  let container = Container::new();
  container.register("lazy", Lifecycle::Singleton, |_: &Container| -> Result<u8, BoxError> {
    panic!("registry inspection must not run recipes")
  });

  let registry = container.bindings();
  assert!(registry.has("lazy"));
  assert!(!registry.has("other"));
  assert_eq!(registry.keys(), vec!["lazy".to_string()]);
  assert_eq!(registry.len(), 1);
  assert!(!registry.get("lazy").unwrap().is_resolved());
}

#[test]
fn test_standalone_registry_stores_and_overwrites_bindings() {
  let registry = BindingRegistry::new();
  assert!(registry.is_empty());

  registry.register("clock", Lifecycle::Transient, |_: &Container| Ok(1u64));
  registry.instance("name", String::from("fold"));
  assert_eq!(registry.keys(), vec!["clock".to_string(), "name".to_string()]);
  assert_eq!(registry.get("clock").unwrap().lifecycle(), Lifecycle::Transient);
  assert!(registry.get("name").unwrap().is_resolved());

  // Last writer wins.
  registry.register("clock", Lifecycle::Singleton, |_: &Container| Ok(2u64));
  assert_eq!(registry.len(), 2);
  let clock = registry.get("clock").unwrap();
  assert_eq!(clock.lifecycle(), Lifecycle::Singleton);
  assert!(!clock.is_resolved());
}
