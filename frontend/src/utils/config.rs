use portal_viewmodel::PollConfig;

pub const API_BASE_URL: &str = env!("API_BASE_URL");
pub const POLL_INTERVAL_MS: &str = env!("POLL_INTERVAL_MS");
pub const STORAGE_NAMESPACE: &str = env!("STORAGE_NAMESPACE");

/// Poll settings of one table block, from the values baked in at build time.
pub fn poll_config(label: &str) -> PollConfig {
  let config = PollConfig::new(label).with_namespace(STORAGE_NAMESPACE);
  match POLL_INTERVAL_MS.parse::<u64>() {
    Ok(millis) => config.with_interval_millis(millis),
    Err(_) => config
  }
}
