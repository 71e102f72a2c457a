use fibre_fold::{Container, Error};

struct ServiceA;
struct ServiceB;

fn main() {
  let container = Container::new();

  // --- An unregistered key ---
  match container.resolve("unregistered") {
    Err(Error::UnknownBinding(key)) => println!("Correctly rejected unknown key '{}'.", key),
    _ => panic!("Should not have found the service!"),
  }

  // --- A circular dependency: a -> b -> a ---
  container.singleton("a", |c: &Container| {
    c.resolve("b")?;
    Ok(ServiceA)
  });
  container.singleton("b", |c: &Container| {
    c.resolve("a")?;
    Ok(ServiceB)
  });

  match container.resolve("a") {
    Err(err @ Error::CircularDependency(_)) => println!("{}", err),
    _ => panic!("The cycle should have been detected!"),
  }

  // The container is still usable for everything else.
  container.instance("answer", 42u32);
  println!("answer = {}", container.resolve_as::<u32>("answer").unwrap());
}
