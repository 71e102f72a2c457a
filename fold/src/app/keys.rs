//! Typed keys for the bindings registered by `HelpersProvider` and `AppProvider`.
//!
//! The short aliases (`"Env"`, `"Config"`, ...) resolve to the same bindings.

use crate::app::{
  Config, Env, Exchange, Helpers, Logger, RequestConstructor, ResponseConstructor, Router, Server,
};
use crate::{Extensions, Key};

pub const HELPERS: Key<Helpers> = Key::new("Fibre/Src/Helpers");
pub const ENV: Key<Env> = Key::new("Fibre/Src/Env");
pub const CONFIG: Key<Config> = Key::new("Fibre/Src/Config");
pub const CONTEXT: Key<Extensions<Exchange>> = Key::new("Fibre/Src/Context");
pub const REQUEST: Key<RequestConstructor> = Key::new("Fibre/Src/Request");
pub const RESPONSE: Key<ResponseConstructor> = Key::new("Fibre/Src/Response");
pub const ROUTE: Key<Router> = Key::new("Fibre/Src/Route");
pub const LOGGER: Key<Logger> = Key::new("Fibre/Src/Logger");
pub const SERVER: Key<Server> = Key::new("Fibre/Src/Server");
