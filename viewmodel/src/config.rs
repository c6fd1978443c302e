use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_NAMESPACE: &str = "portal";

#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
  pub interval: Duration,
  /// Host identifier used to namespace persisted preferences.
  pub namespace: String,
  /// Name used in log lines, usually the block title.
  pub label: String
}

impl Default for PollConfig {
  fn default() -> Self {
    PollConfig {
      interval: DEFAULT_POLL_INTERVAL,
      namespace: DEFAULT_NAMESPACE.to_string(),
      label: "table".to_string()
    }
  }
}

impl PollConfig {
  pub fn new(label: &str) -> Self {
    PollConfig { label: label.to_string(), ..Self::default() }
  }

  pub fn with_interval(mut self, interval: Duration) -> Self {
    // a zero interval would spin the poll loop
    self.interval = interval.max(Duration::from_millis(1));
    self
  }

  pub fn with_interval_millis(self, millis: u64) -> Self {
    self.with_interval(Duration::from_millis(millis))
  }

  pub fn with_namespace(mut self, namespace: &str) -> Self {
    self.namespace = namespace.to_string();
    self
  }
}
