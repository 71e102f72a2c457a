use crate::app::Config;

/// A named log channel. Formatting and sinks belong to whichever `tracing`
/// subscriber the host installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
  channel: String,
}

impl Logger {
  pub const DEFAULT_CHANNEL: &'static str = "app";

  /// Picks the channel from `app.logger.channel`.
  pub fn from_config(config: &Config) -> Self {
    let channel = config
      .get("app.logger.channel")
      .and_then(|value| value.as_str().map(str::to_owned))
      .unwrap_or_else(|| Self::DEFAULT_CHANNEL.to_owned());
    Self { channel }
  }

  pub fn channel(&self) -> &str {
    &self.channel
  }

  pub fn debug(&self, message: &str) {
    tracing::debug!(channel = %self.channel, "{message}");
  }

  pub fn info(&self, message: &str) {
    tracing::info!(channel = %self.channel, "{message}");
  }

  pub fn warn(&self, message: &str) {
    tracing::warn!(channel = %self.channel, "{message}");
  }

  pub fn error(&self, message: &str) {
    tracing::error!(channel = %self.channel, "{message}");
  }
}
