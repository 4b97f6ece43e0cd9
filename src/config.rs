// src/config.rs
use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::services::{prompt::HistoryLimits, retry::RetryPolicy};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Everything read from the environment at startup. Built once in `main`
/// and handed to the state; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http: HttpSettings,
    pub upstream: UpstreamSettings,
    pub chat: ChatSettings,
}

#[derive(Clone, Debug)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct UpstreamSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Applied to each individual HTTP attempt.
    pub timeout: Duration,
}

// Keep the key out of debug output.
impl std::fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Per-request behaviour of the chat endpoint.
#[derive(Clone, Debug)]
pub struct ChatSettings {
    pub retry: RetryPolicy,
    /// Upper bound on the whole retrying call, backoff included.
    pub deadline: Duration,
    pub history: HistoryLimits,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            deadline: Duration::from_secs(30),
            history: HistoryLimits::default(),
        }
    }
}

impl AppConfig {
    /// Reads `.env` if there is one. A missing file is fine, a broken one is not.
    /// Runs before logging is set up so `RUST_LOG` can come from the file;
    /// the caller reports the returned path.
    pub fn load_dotenv() -> anyhow::Result<Option<PathBuf>> {
        Self::load_dotenv_from(Path::new(".env"))
    }

    pub fn load_dotenv_from(path: &Path) -> anyhow::Result<Option<PathBuf>> {
        match dotenvy::from_path(path) {
            Ok(()) => Ok(Some(path.to_path_buf())),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e).with_context(|| format!("malformed env file {}", path.display())),
        }
    }

    pub fn from_env() -> Self {
        let defaults = ChatSettings::default();
        let retry = RetryPolicy {
            max_attempts: env_num("CHAT_RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts),
            initial_wait: Duration::from_millis(env_num(
                "CHAT_RETRY_INITIAL_WAIT_MS",
                defaults.retry.initial_wait.as_millis() as u64,
            )),
            multiplier: env_num("CHAT_RETRY_MULTIPLIER", defaults.retry.multiplier),
        }
        .normalized();

        let history = HistoryLimits {
            max_entries: env_num("CHAT_HISTORY_LIMIT", defaults.history.max_entries),
            max_entry_chars: env_num(
                "CHAT_HISTORY_ENTRY_MAX_CHARS",
                defaults.history.max_entry_chars,
            ),
        };

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            http: HttpSettings {
                host: env_or("HOST", "0.0.0.0"),
                port: env_num("PORT", DEFAULT_PORT),
                allowed_origins: parse_origins(&env_or("CORS_ALLOWED_ORIGINS", "http://localhost:5173")),
            },
            upstream: UpstreamSettings {
                api_key,
                model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
                base_url: env_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
                timeout: Duration::from_secs(env_num("GEMINI_TIMEOUT_SECS", 20)),
            },
            chat: ChatSettings {
                retry,
                deadline: Duration::from_secs(env_num("CHAT_DEADLINE_SECS", 30)),
                history,
            },
        }
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.http.host, self.http.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.http.host, self.http.port))
    }

    pub fn log_summary(&self) {
        if self.upstream.api_key.is_none() {
            tracing::error!("GEMINI_API_KEY is not set; /api/chat will answer 500 until it is");
        }
        tracing::info!(
            model = %self.upstream.model,
            base_url = %self.upstream.base_url,
            attempt_timeout = ?self.upstream.timeout,
            "upstream configured"
        );
        tracing::info!(
            max_attempts = self.chat.retry.max_attempts,
            initial_wait = ?self.chat.retry.initial_wait,
            multiplier = self.chat.retry.multiplier,
            deadline = ?self.chat.deadline,
            history_limit = self.chat.history.max_entries,
            "chat settings"
        );
    }
}

fn env_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(v) => v.trim().to_string(),
        Err(_) => default.to_string(),
    }
}

fn env_num<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("ENV `{}` has invalid value `{}`, using default", name, v);
            default
        }),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://chat.example.com ,"),
            vec!["http://localhost:5173", "https://chat.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn dotenv_file_is_optional_but_must_parse() {
        let dir = env::temp_dir().join(format!("study-chat-dotenv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("absent.env");
        assert_eq!(AppConfig::load_dotenv_from(&missing).unwrap(), None);

        let good = dir.join("good.env");
        std::fs::write(&good, "STUDY_CHAT_DOTENV_LOG_LEVEL=debug\n").unwrap();
        assert_eq!(AppConfig::load_dotenv_from(&good).unwrap(), Some(good.clone()));
        assert_eq!(env::var("STUDY_CHAT_DOTENV_LOG_LEVEL").unwrap(), "debug");

        let broken = dir.join("broken.env");
        std::fs::write(&broken, "BROKEN=\"unterminated\n").unwrap();
        assert!(AppConfig::load_dotenv_from(&broken).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn chat_defaults() {
        let chat = ChatSettings::default();
        assert_eq!(chat.retry.max_attempts, 2);
        assert_eq!(chat.retry.initial_wait, Duration::from_millis(500));
        assert_eq!(chat.retry.multiplier, 2);
        assert_eq!(chat.deadline, Duration::from_secs(30));
    }

    #[test]
    fn debug_hides_api_key() {
        let upstream = UpstreamSettings {
            api_key: Some("super-secret-key".into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
        };
        let printed = format!("{upstream:?}");
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("<set>"));
    }
}
