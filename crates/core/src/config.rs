//! Runtime settings resolved once at process start and passed down.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini-2025-04-14";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_WORK_DIR: &str = "temporary_files";
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_ORACLE_ATTEMPTS: u32 = 2;

/// Credentials, model choice and file locations for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    /// Where transcripts, segment sets and clips are written.
    pub work_dir: PathBuf,
    pub oracle_timeout_secs: u64,
    pub oracle_attempts: u32,
}

impl Config {
    /// Build a config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            oracle_timeout_secs: DEFAULT_ORACLE_TIMEOUT_SECS,
            oracle_attempts: DEFAULT_ORACLE_ATTEMPTS,
        }
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Chat completions endpoint under `api_base`.
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_endpoint() {
        let mut config = Config::new("sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.oracle_attempts, 2);
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");
        config.api_base = "http://127.0.0.1:8080/v1/".into();
        assert_eq!(config.chat_url(), "http://127.0.0.1:8080/v1/chat/completions");
    }
}
