use crate::app::{Exchange, HttpContextExt, Logger, ResponseSnapshot, Router};
use crate::{Extensions, Result};
use std::sync::Arc;

/// Dispatches requests: one fresh `HttpContext` per request, routed by the
/// lazily built `request` accessor and answered through `response`.
#[derive(Debug)]
pub struct Server {
  context: Arc<Extensions<Exchange>>,
  router: Arc<Router>,
  logger: Arc<Logger>,
}

impl Server {
  pub fn new(context: Arc<Extensions<Exchange>>, router: Arc<Router>, logger: Arc<Logger>) -> Self {
    Self {
      context,
      router,
      logger,
    }
  }

  pub fn router(&self) -> &Arc<Router> {
    &self.router
  }

  /// Handles one request. Handler failures become a 500 response; only
  /// failures of the context accessors themselves are returned as errors.
  pub fn handle(&self, exchange: Exchange) -> Result<ResponseSnapshot> {
    let ctx = self.context.context(exchange);
    let request = ctx.request()?;
    let response = ctx.response()?;
    let method = request.method();

    match self.router.find(&method, request.path()) {
      Some(route) => {
        if let Err(e) = (route.handler())(&ctx) {
          self
            .logger
            .error(&format!("{} {} failed: {}", method, request.path(), e));
          response.status(500).send("Internal Server Error");
        }
      }
      None => {
        response
          .status(404)
          .send(format!("Route not found {} {}", method, request.path()));
      }
    }

    Ok(response.snapshot())
  }
}
