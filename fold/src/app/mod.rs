//! A small framework core composed from service providers.
//!
//! `HelpersProvider` and `AppProvider` register the framework's collaborators
//! under namespaced keys (see [`keys`]) with short aliases. During boot,
//! `AppProvider` attaches cached `request` and `response` accessors to the
//! HTTP context, which `Server` creates once per request.
//!
//! ```
//! use fibre_fold::app::{self, keys, Exchange, HttpContextExt};
//! use fibre_fold::Container;
//!
//! let container = Container::new();
//! fibre_fold::run_providers(&container, app::providers("/srv/app")).unwrap();
//!
//! let server = container.get(&keys::SERVER).unwrap();
//! server.router().get("/ping", |ctx| {
//!   ctx.response()?.send("pong");
//!   Ok(())
//! });
//!
//! let reply = server.handle(Exchange::new("GET", "/ping")).unwrap();
//! assert_eq!(reply.status, 200);
//! assert_eq!(reply.body.as_deref(), Some("pong"));
//! ```

mod config;
mod env;
mod helpers;
mod http;
pub mod keys;
mod logger;
mod provider;
mod route;
mod server;

pub use config::Config;
pub use env::Env;
pub use helpers::{Helpers, HelpersProvider};
pub use http::{
  Exchange, HttpContext, HttpContextExt, Request, RequestConstructor, Response,
  ResponseConstructor, ResponseSnapshot,
};
pub use logger::Logger;
pub use provider::AppProvider;
pub use route::{Handler, Route, Router};
pub use server::Server;

use crate::ServiceProvider;
use std::path::PathBuf;

/// The default provider list for an application rooted at `app_root`.
pub fn providers(app_root: impl Into<PathBuf>) -> Vec<Box<dyn ServiceProvider>> {
  vec![
    Box::new(AppProvider),
    Box::new(HelpersProvider::new(app_root)),
  ]
}
