use crate::app::{
  keys, Config, Env, Exchange, HttpContext, Logger, Request, RequestConstructor, Response,
  ResponseConstructor, Router, Server,
};
use crate::{BoxError, Container, Extensions, Registrar, ServiceProvider};

/// Wires the framework core: environment, config, routing, logging, the HTTP
/// context with its `request`/`response` accessors, and the server.
///
/// Depends on `Fibre/Src/Helpers`, which `HelpersProvider` registers.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppProvider;

impl AppProvider {
  fn register_env(app: &Registrar<'_>) {
    app.singleton(keys::ENV.name(), |c: &Container| {
      let helpers = c.get(&keys::HELPERS)?;
      Ok(Env::load(helpers.app_root())?)
    });
    app.alias("Env", keys::ENV.name());
  }

  fn register_config(app: &Registrar<'_>) {
    app.singleton(keys::CONFIG.name(), |c: &Container| {
      let helpers = c.get(&keys::HELPERS)?;
      Config::load(&helpers.config_path())
    });
    app.alias("Config", keys::CONFIG.name());
  }

  /// A singleton, unlike the other per-call bindings: getters defined at boot
  /// must be visible to every request context.
  fn register_context(app: &Registrar<'_>) {
    app.singleton(keys::CONTEXT.name(), |_: &Container| {
      Ok(Extensions::<Exchange>::new())
    });
    app.alias("Context", keys::CONTEXT.name());
  }

  fn register_request(app: &Registrar<'_>) {
    app.bind(keys::REQUEST.name(), |_: &Container| {
      Ok(Request::new as RequestConstructor)
    });
  }

  fn register_response(app: &Registrar<'_>) {
    app.bind(keys::RESPONSE.name(), |_: &Container| {
      Ok(Response::new as ResponseConstructor)
    });
  }

  fn register_route(app: &Registrar<'_>) {
    app.singleton(keys::ROUTE.name(), |_: &Container| Ok(Router::new()));
    app.alias("Route", keys::ROUTE.name());
  }

  fn register_logger(app: &Registrar<'_>) {
    app.singleton(keys::LOGGER.name(), |c: &Container| {
      let config = c.get(&keys::CONFIG)?;
      Ok(Logger::from_config(&config))
    });
    app.alias("Logger", keys::LOGGER.name());
  }

  fn register_server(app: &Registrar<'_>) {
    app.singleton(keys::SERVER.name(), |c: &Container| {
      Ok(Server::new(
        c.get(&keys::CONTEXT)?,
        c.get(&keys::ROUTE)?,
        c.get(&keys::LOGGER)?,
      ))
    });
    app.alias("Server", keys::SERVER.name());
  }
}

impl ServiceProvider for AppProvider {
  fn name(&self) -> &str {
    "AppProvider"
  }

  fn register(&self, app: &Registrar<'_>) -> Result<(), BoxError> {
    Self::register_env(app);
    Self::register_config(app);
    Self::register_context(app);
    Self::register_request(app);
    Self::register_response(app);
    Self::register_route(app);
    Self::register_logger(app);
    Self::register_server(app);
    Ok(())
  }

  fn boot(&self, container: &Container) -> Result<(), BoxError> {
    let context = container.get(&keys::CONTEXT)?;
    let make_request = *container.get(&keys::REQUEST)?;
    let make_response = *container.get(&keys::RESPONSE)?;
    let config = container.get(&keys::CONFIG)?;

    context.define(
      "request",
      move |ctx: &HttpContext| Ok(make_request(ctx.state(), config.clone())),
      true,
    );
    context.define(
      "response",
      move |ctx: &HttpContext| Ok(make_response(ctx.state())),
      true,
    );
    Ok(())
  }
}
