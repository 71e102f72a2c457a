//! Two-phase startup of service providers.
//!
//! Every provider first *registers* its bindings. Only once all of them have
//! registered does any provider *boot*, so a provider's boot step can resolve
//! bindings contributed by any other provider, regardless of their order.

use crate::binding::Lifecycle;
use crate::error::{BoxError, Error, Result};
use crate::Container;
use std::any::Any;
use std::fmt;

/// A unit that contributes bindings and cross-cutting setup to a container.
pub trait ServiceProvider: Send + Sync {
  /// A name identifying the provider in startup errors and logs.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  /// Adds bindings and aliases. Nothing may be resolved here.
  fn register(&self, registrar: &Registrar<'_>) -> std::result::Result<(), BoxError>;

  /// Runs after every provider has registered. May resolve any binding.
  fn boot(&self, _container: &Container) -> std::result::Result<(), BoxError> {
    Ok(())
  }
}

/// The registration-only view of a container handed to `ServiceProvider::register`.
pub struct Registrar<'a> {
  container: &'a Container,
}

impl<'a> Registrar<'a> {
  pub fn new(container: &'a Container) -> Self {
    Self { container }
  }

  pub fn register<T, F>(&self, key: impl Into<String>, lifecycle: Lifecycle, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    self.container.register(key, lifecycle, recipe);
  }

  pub fn singleton<T, F>(&self, key: impl Into<String>, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    self.container.singleton(key, recipe);
  }

  pub fn bind<T, F>(&self, key: impl Into<String>, recipe: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
  {
    self.container.bind(key, recipe);
  }

  pub fn instance<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
    self.container.instance(key, value);
  }

  pub fn alias(&self, name: impl Into<String>, target: impl Into<String>) {
    self.container.alias(name, target);
  }

  pub fn has(&self, key: &str) -> bool {
    self.container.has(key)
  }
}

/// Where a `Bootstrapper` is in the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  NotStarted,
  Registering,
  Registered,
  Booting,
  Booted,
  /// A provider failed. Startup cannot continue.
  Failed,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Phase::NotStarted => "not started",
      Phase::Registering => "register",
      Phase::Registered => "registered",
      Phase::Booting => "boot",
      Phase::Booted => "booted",
      Phase::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Drives an ordered list of providers through register, then boot.
///
/// The phases form an enforced state machine:
/// `NotStarted -> Registering -> Registered -> Booting -> Booted`, with any
/// provider failure moving to `Failed`. State already applied by earlier
/// providers is not rolled back.
pub struct Bootstrapper<'a> {
  container: &'a Container,
  providers: Vec<Box<dyn ServiceProvider>>,
  phase: Phase,
}

impl<'a> Bootstrapper<'a> {
  pub fn new(container: &'a Container) -> Self {
    Self {
      container,
      providers: Vec::new(),
      phase: Phase::NotStarted,
    }
  }

  pub fn with_providers(
    container: &'a Container,
    providers: impl IntoIterator<Item = Box<dyn ServiceProvider>>,
  ) -> Self {
    Self {
      providers: providers.into_iter().collect(),
      ..Self::new(container)
    }
  }

  /// Appends a provider. Only allowed before registration starts.
  pub fn add(&mut self, provider: impl ServiceProvider + 'static) -> Result<()> {
    self.expect_phase(Phase::NotStarted)?;
    self.providers.push(Box::new(provider));
    Ok(())
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn len(&self) -> usize {
    self.providers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.providers.is_empty()
  }

  /// Runs `register` on every provider, in order.
  pub fn register(&mut self) -> Result<()> {
    self.expect_phase(Phase::NotStarted)?;
    self.phase = Phase::Registering;
    tracing::info!(providers = self.providers.len(), "registering providers");

    let registrar = Registrar::new(self.container);
    for provider in &self.providers {
      tracing::debug!(provider = provider.name(), "register");
      if let Err(cause) = provider.register(&registrar) {
        self.phase = Phase::Failed;
        return Err(startup_error(provider.as_ref(), Phase::Registering, cause));
      }
    }

    self.phase = Phase::Registered;
    Ok(())
  }

  /// Runs `boot` on every provider, in order. Fails unless every provider has
  /// registered.
  pub fn boot(&mut self) -> Result<()> {
    self.expect_phase(Phase::Registered)?;
    self.phase = Phase::Booting;
    tracing::info!(providers = self.providers.len(), "booting providers");

    for provider in &self.providers {
      tracing::debug!(provider = provider.name(), "boot");
      if let Err(cause) = provider.boot(self.container) {
        self.phase = Phase::Failed;
        return Err(startup_error(provider.as_ref(), Phase::Booting, cause));
      }
    }

    self.phase = Phase::Booted;
    Ok(())
  }

  /// Registers, then boots, every provider.
  pub fn run(&mut self) -> Result<()> {
    self.register()?;
    self.boot()
  }

  fn expect_phase(&self, expected: Phase) -> Result<()> {
    if self.phase == expected {
      Ok(())
    } else {
      Err(Error::InvalidPhase {
        expected,
        found: self.phase,
      })
    }
  }
}

fn startup_error(provider: &dyn ServiceProvider, phase: Phase, cause: BoxError) -> Error {
  tracing::error!(provider = provider.name(), %phase, error = %cause, "provider startup failed");
  Error::ProviderStartup {
    provider: provider.name().to_owned(),
    phase,
    cause,
  }
}

/// Registers and boots `providers` against `container`.
///
/// This is the startup entry point for a hosting process. An error means the
/// process must not go on to serve requests.
pub fn run_providers(
  container: &Container,
  providers: impl IntoIterator<Item = Box<dyn ServiceProvider>>,
) -> Result<()> {
  Bootstrapper::with_providers(container, providers).run()
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Noop;

  impl ServiceProvider for Noop {
    fn register(&self, _: &Registrar<'_>) -> std::result::Result<(), BoxError> {
      Ok(())
    }
  }

  #[test]
  fn boot_before_register_is_rejected() {
    let container = Container::new();
    let mut boot = Bootstrapper::new(&container);
    boot.add(Noop).unwrap();

    match boot.boot() {
      Err(Error::InvalidPhase { expected, found }) => {
        assert_eq!(expected, Phase::Registered);
        assert_eq!(found, Phase::NotStarted);
      }
      other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(boot.phase(), Phase::NotStarted);
  }

  #[test]
  fn phases_advance_in_order_and_cannot_repeat() {
    let container = Container::new();
    let mut boot = Bootstrapper::new(&container);
    boot.add(Noop).unwrap();

    boot.register().unwrap();
    assert_eq!(boot.phase(), Phase::Registered);
    assert!(boot.add(Noop).is_err());
    assert!(boot.register().is_err());

    boot.boot().unwrap();
    assert_eq!(boot.phase(), Phase::Booted);
    assert!(boot.boot().is_err());
  }

  #[test]
  fn default_name_is_the_type_name() {
    assert!(Noop.name().ends_with("Noop"));
  }
}
