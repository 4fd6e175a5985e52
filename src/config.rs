use std::{env, path::PathBuf, time::Duration};

/// Simulated latency of a login round trip.
pub const DEFAULT_LOGIN_LATENCY_MS: u64 = 1000;
/// Simulated latency of a remote role update.
pub const DEFAULT_ROLE_UPDATE_LATENCY_MS: u64 = 500;

const DEFAULT_SESSION_DIR: &str = ".estate-session";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and pulled into
/// handlers via `FromRef`, like the rest of the shared state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which values are mandatory.
    pub env: Env,
    // Directory of the file-backed key-value store holding the session record.
    pub session_dir: PathBuf,
    // Address the local shell listens on.
    pub bind_addr: String,
    // Simulated latency of `AccountDirectory::find_by_email`.
    pub login_latency: Duration,
    // Simulated latency of `AccountDirectory::update_role`.
    pub role_update_latency: Duration,
}

/// Env
///
/// The runtime context: pretty logs and relaxed defaults locally, JSON logs and
/// explicit settings in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// A non-panicking configuration for tests: no simulated latency, so suspending
    /// operations settle on the next poll.
    fn default() -> Self {
        Self {
            env: Env::Local,
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            login_latency: Duration::ZERO,
            role_update_latency: Duration::ZERO,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics if `SESSION_DIR` is missing in production, or if a latency variable is
    /// set to something other than a whole number of milliseconds. The shell should
    /// not start with a configuration it cannot honour.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let session_dir = match env {
            Env::Production => env::var("SESSION_DIR")
                .expect("FATAL: SESSION_DIR must be set in production."),
            Env::Local => {
                env::var("SESSION_DIR").unwrap_or_else(|_| DEFAULT_SESSION_DIR.to_string())
            }
        };

        Self {
            env,
            session_dir: PathBuf::from(session_dir),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            login_latency: latency_from_env("LOGIN_LATENCY_MS", DEFAULT_LOGIN_LATENCY_MS),
            role_update_latency: latency_from_env(
                "ROLE_UPDATE_LATENCY_MS",
                DEFAULT_ROLE_UPDATE_LATENCY_MS,
            ),
        }
    }
}

fn latency_from_env(name: &str, default_ms: u64) -> Duration {
    let millis = match env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
            panic!("FATAL: {name} must be a whole number of milliseconds, got {raw:?}")
        }),
        Err(_) => default_ms,
    };
    Duration::from_millis(millis)
}
