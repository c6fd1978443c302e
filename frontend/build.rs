use dotenvy::dotenv;

const SETTINGS: [(&str, &str); 3] = [
  ("API_BASE_URL", "http://localhost:7575"),
  ("POLL_INTERVAL_MS", "5000"),
  ("STORAGE_NAMESPACE", "portal"),
];

fn main() {
  // Tell Cargo that if the env file changes, to rerun this build script.
  println!("cargo::rerun-if-changed=.env");

  // a missing .env is fine, every setting has a default
  let _ = dotenv();

  for (key, default) in SETTINGS {
    println!("cargo::rerun-if-env-changed={}", key);
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    println!("cargo::rustc-env={}={}", key, value);
  }
}
