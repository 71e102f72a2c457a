use crate::app::HttpContext;
use crate::BoxError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A request handler. It writes its result through the context's `response`.
pub type Handler = Arc<dyn Fn(&HttpContext) -> Result<(), BoxError> + Send + Sync>;

#[derive(Clone)]
pub struct Route {
  method: String,
  path: String,
  handler: Handler,
}

impl Route {
  pub fn method(&self) -> &str {
    &self.method
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn handler(&self) -> &Handler {
    &self.handler
  }
}

impl fmt::Debug for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Route")
      .field("method", &self.method)
      .field("path", &self.path)
      .finish_non_exhaustive()
  }
}

/// An exact-match route table.
#[derive(Debug, Default)]
pub struct Router {
  routes: RwLock<Vec<Route>>,
}

impl Router {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a route, replacing an existing one for the same method and path.
  pub fn route<F>(&self, method: &str, path: &str, handler: F)
  where
    F: Fn(&HttpContext) -> Result<(), BoxError> + Send + Sync + 'static,
  {
    let route = Route {
      method: method.to_ascii_uppercase(),
      path: path.to_owned(),
      handler: Arc::new(handler),
    };
    let mut routes = self.routes.write();
    routes.retain(|r| !(r.method == route.method && r.path == route.path));
    routes.push(route);
  }

  pub fn get<F>(&self, path: &str, handler: F)
  where
    F: Fn(&HttpContext) -> Result<(), BoxError> + Send + Sync + 'static,
  {
    self.route("GET", path, handler);
  }

  pub fn post<F>(&self, path: &str, handler: F)
  where
    F: Fn(&HttpContext) -> Result<(), BoxError> + Send + Sync + 'static,
  {
    self.route("POST", path, handler);
  }

  pub fn find(&self, method: &str, path: &str) -> Option<Route> {
    self
      .routes
      .read()
      .iter()
      .find(|r| r.path == path && r.method.eq_ignore_ascii_case(method))
      .cloned()
  }

  pub fn len(&self) -> usize {
    self.routes.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.read().is_empty()
  }
}
