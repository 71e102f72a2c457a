use fibre_fold::app::{self, keys, Exchange, HttpContextExt};
use fibre_fold::Container;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> fibre_fold::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let container = Container::new();
  fibre_fold::run_providers(&container, app::providers(env!("CARGO_MANIFEST_DIR")))?;

  let server = container.get(&keys::SERVER)?;
  server.router().get("/hello", |ctx| {
    let request = ctx.request()?;
    let name = request.input("name").unwrap_or("world");
    ctx.response()?.json(&json!({ "greeting": format!("Hello, {}!", name) }));
    Ok(())
  });

  for url in ["/hello?name=fibre", "/hello", "/missing"] {
    let reply = server.handle(Exchange::new("GET", url))?;
    println!("GET {} -> {} {}", url, reply.status, reply.body.unwrap_or_default());
  }
  Ok(())
}
