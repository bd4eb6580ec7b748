use std::time::Duration;

/// Where the loader fetches rules from, and how long it waits.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Base URL of the rules service, without a trailing slash.
    pub api_url: String,
    /// Upper bound on one rules request, connect included.
    pub fetch_timeout: Duration,
}

impl LoaderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `FIELDRULES_API_URL`       | `http://localhost:3000` |
    /// | `RULES_FETCH_TIMEOUT_SECS` | `10`                    |
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("FIELDRULES_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        let fetch_timeout_secs: u64 = std::env::var("RULES_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("RULES_FETCH_TIMEOUT_SECS must be a valid u64");

        Self::new(api_url, Duration::from_secs(fetch_timeout_secs))
    }

    pub fn new(api_url: impl Into<String>, fetch_timeout: Duration) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            fetch_timeout,
        }
    }
}
