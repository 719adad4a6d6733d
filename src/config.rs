use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_EMAIL: &str = "nikhil.test.editor@example.com";
pub const DEFAULT_PASSWORD: &str = "testpass123";
pub const DEFAULT_ORGANIZATION: &str = "org_main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Where the backend lives and who to log in as. Every value has a
/// hardcoded default that the environment (and then the command line)
/// may override.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub credentials: Credentials,
    /// Sent with registrations; the backend requires one.
    pub organization: String,
    /// Per-request timeout, unset means wait indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load `.env` if present, then read `VIDHOST_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("VIDHOST_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = lookup("VIDHOST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: Credentials {
                email: lookup("VIDHOST_EMAIL").unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
                password: lookup("VIDHOST_PASSWORD")
                    .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            },
            organization: lookup("VIDHOST_ORGANIZATION")
                .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
            timeout,
        }
    }

    /// Same config with `timeout` filled in when none was configured.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout.get_or_insert(timeout);
        self
    }
}
