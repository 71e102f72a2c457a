//! Request and response accessors built lazily from the raw exchange.

use crate::app::Config;
use crate::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::form_urlencoded;

/// The raw parts of one inbound request, as handed over by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
  pub method: String,
  pub url: String,
  pub headers: HashMap<String, String>,
  pub body: Option<String>,
}

impl Exchange {
  pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      method: method.into(),
      url: url.into(),
      ..Self::default()
    }
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(name.into().to_ascii_lowercase(), value.into());
    self
  }

  pub fn body(mut self, body: impl Into<String>) -> Self {
    self.body = Some(body.into());
    self
  }
}

/// The per-request context of the HTTP server.
pub type HttpContext = Context<Exchange>;

/// Builds the `request` accessor. Bound in the container so it can be replaced.
pub type RequestConstructor = fn(&Exchange, Arc<Config>) -> Request;

/// Builds the `response` accessor.
pub type ResponseConstructor = fn(&Exchange) -> Response;

/// A parsed view of the inbound request.
#[derive(Debug)]
pub struct Request {
  method: String,
  path: String,
  query: HashMap<String, String>,
  headers: HashMap<String, String>,
  body: Option<String>,
  config: Arc<Config>,
}

impl Request {
  pub fn new(exchange: &Exchange, config: Arc<Config>) -> Self {
    let (path, query) = match exchange.url.split_once('?') {
      Some((path, query)) => (path, parse_query(query)),
      None => (exchange.url.as_str(), HashMap::new()),
    };
    Self {
      method: exchange.method.to_ascii_uppercase(),
      path: if path.is_empty() { "/".to_owned() } else { path.to_owned() },
      query,
      headers: exchange.headers.clone(),
      body: exchange.body.clone(),
      config,
    }
  }

  /// The request method, honouring a `_method` query override when
  /// `app.http.allowMethodSpoofing` is enabled for POST requests.
  pub fn method(&self) -> String {
    let spoofing = self
      .config
      .get("app.http.allowMethodSpoofing")
      .and_then(|value| value.as_bool())
      .unwrap_or(false);
    match self.query.get("_method") {
      Some(spoofed) if spoofing && self.method == "POST" => spoofed.to_ascii_uppercase(),
      _ => self.method.clone(),
    }
  }

  pub fn intended_method(&self) -> &str {
    &self.method
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn input(&self, key: &str) -> Option<&str> {
    self.query.get(key).map(String::as_str)
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .get(&name.to_ascii_lowercase())
      .map(String::as_str)
  }

  pub fn raw_body(&self) -> Option<&str> {
    self.body.as_deref()
  }
}

fn parse_query(query: &str) -> HashMap<String, String> {
  form_urlencoded::parse(query.as_bytes())
    .into_owned()
    .collect()
}

/// The outbound response, filled in by handlers through a shared reference.
#[derive(Debug)]
pub struct Response {
  inner: Mutex<ResponseSnapshot>,
}

/// The state of a `Response` at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Option<String>,
}

impl Response {
  pub fn new(_exchange: &Exchange) -> Self {
    Self {
      inner: Mutex::new(ResponseSnapshot {
        status: 200,
        headers: Vec::new(),
        body: None,
      }),
    }
  }

  pub fn status(&self, status: u16) -> &Self {
    self.inner.lock().status = status;
    self
  }

  pub fn header(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
    self.inner.lock().headers.push((name.into(), value.into()));
    self
  }

  pub fn send(&self, body: impl Into<String>) {
    self.inner.lock().body = Some(body.into());
  }

  pub fn json(&self, value: &serde_json::Value) {
    let mut inner = self.inner.lock();
    inner
      .headers
      .push(("content-type".to_owned(), "application/json".to_owned()));
    inner.body = Some(value.to_string());
  }

  pub fn snapshot(&self) -> ResponseSnapshot {
    self.inner.lock().clone()
  }
}

/// Typed access to the accessors `AppProvider` defines on `HttpContext`.
pub trait HttpContextExt {
  fn request(&self) -> Result<Arc<Request>>;
  fn response(&self) -> Result<Arc<Response>>;
}

impl HttpContextExt for HttpContext {
  fn request(&self) -> Result<Arc<Request>> {
    self.get_as::<Request>("request")
  }

  fn response(&self) -> Result<Arc<Response>> {
    self.get_as::<Response>("response")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn url_is_split_into_path_and_query() {
    let exchange = Exchange::new("get", "/users?page=2&active").header("X-Trace", "abc");
    let request = Request::new(&exchange, Arc::new(Config::default()));

    assert_eq!(request.method(), "GET");
    assert_eq!(request.path(), "/users");
    assert_eq!(request.input("page"), Some("2"));
    assert_eq!(request.input("active"), Some(""));
    assert_eq!(request.header("x-trace"), Some("abc"));
  }

  #[test]
  fn query_values_are_percent_decoded() {
    let exchange = Exchange::new("POST", "/search?q=hello%20world&name=a+b&_method=%70ut");
    let config = Arc::new(Config::default());
    config.set("app.http.allowMethodSpoofing", json!(true));
    let request = Request::new(&exchange, config);

    assert_eq!(request.input("q"), Some("hello world"));
    assert_eq!(request.input("name"), Some("a b"));
    assert_eq!(request.method(), "PUT");
  }

  #[test]
  fn method_spoofing_requires_config_and_post() {
    let exchange = Exchange::new("POST", "/users/1?_method=delete");
    let config = Arc::new(Config::default());
    assert_eq!(Request::new(&exchange, config.clone()).method(), "POST");

    config.set("app.http.allowMethodSpoofing", json!(true));
    let request = Request::new(&exchange, config.clone());
    assert_eq!(request.method(), "DELETE");
    assert_eq!(request.intended_method(), "POST");

    let get = Exchange::new("GET", "/users/1?_method=delete");
    assert_eq!(Request::new(&get, config).method(), "GET");
  }
}
