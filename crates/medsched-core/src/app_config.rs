use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level settings read from the environment.
///
/// Per-source data (URLs, site tables, clinic names) lives in the sources
/// file referenced by `sources_path`, not here.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub sources_path: PathBuf,
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Pause applied by the HTTP fetcher before every request.
    pub inter_request_delay_ms: u64,
}
