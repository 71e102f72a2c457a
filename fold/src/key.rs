use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// A binding key that remembers the type stored under it.
///
/// The container itself stays an open, string-keyed table; a `Key<T>` only
/// adds a checked downcast at the call site for keys whose type is known.
///
/// ```
/// use fibre_fold::{Container, Key};
///
/// const GREETING: Key<String> = Key::new("app.greeting");
///
/// let container = Container::new();
/// container.instance(GREETING.name(), String::from("hello"));
/// assert_eq!(*container.get(&GREETING).unwrap(), "hello");
/// ```
pub struct Key<T: ?Sized> {
  name: &'static str,
  _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> Key<T> {
  pub const fn new(name: &'static str) -> Self {
    Self {
      name,
      _marker: PhantomData,
    }
  }

  pub const fn name(&self) -> &'static str {
    self.name
  }
}

impl<T: Any + Send + Sync> Key<T> {
  pub(crate) fn type_name(&self) -> &'static str {
    std::any::type_name::<T>()
  }
}

impl<T: ?Sized> Clone for Key<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T: ?Sized> Copy for Key<T> {}

impl<T: ?Sized> fmt::Debug for Key<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Key({})", self.name)
  }
}

impl<T: ?Sized> fmt::Display for Key<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}
