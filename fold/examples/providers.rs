use fibre_fold::{BoxError, Container, Registrar, ServiceProvider};
use tracing_subscriber::EnvFilter;

struct Mailer {
  transport: String,
}

// Declared first, but boots against the transport registered by the provider after it.
struct MailProvider;

impl ServiceProvider for MailProvider {
  fn name(&self) -> &str {
    "MailProvider"
  }

  fn register(&self, app: &Registrar<'_>) -> Result<(), BoxError> {
    app.singleton("mail.mailer", |c: &Container| {
      let transport = c.resolve_as::<String>("Transport")?;
      Ok(Mailer {
        transport: (*transport).clone(),
      })
    });
    app.alias("Mail", "mail.mailer");
    Ok(())
  }

  fn boot(&self, container: &Container) -> Result<(), BoxError> {
    let mailer = container.resolve_as::<Mailer>("Mail")?;
    println!("Mailer booted over '{}'.", mailer.transport);
    Ok(())
  }
}

struct TransportProvider;

impl ServiceProvider for TransportProvider {
  fn name(&self) -> &str {
    "TransportProvider"
  }

  fn register(&self, app: &Registrar<'_>) -> Result<(), BoxError> {
    app.instance("mail.transport", String::from("smtp://localhost:25"));
    app.alias("Transport", "mail.transport");
    Ok(())
  }
}

fn main() -> fibre_fold::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  let container = Container::new();
  fibre_fold::run_providers(
    &container,
    [
      Box::new(MailProvider) as Box<dyn ServiceProvider>,
      Box::new(TransportProvider),
    ],
  )?;

  println!("Registered keys: {:?}", container.bindings().keys());
  Ok(())
}
