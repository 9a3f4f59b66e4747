use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Session secrets that must not reach production.
pub const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "change-me-to-a-random-string"];

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub secure_cookies: bool,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_or("HABITS_HOST", "0.0.0.0");
        let port: u16 = env_or("HABITS_PORT", "8080")
            .parse()
            .context("HABITS_PORT must be a port number")?;
        let store_timeout_ms: u64 = env_or("HABITS_STORE_TIMEOUT_MS", "5000")
            .parse()
            .context("HABITS_STORE_TIMEOUT_MS must be an integer")?;

        Ok(Self {
            addr: format!("{}:{}", host, port).parse()?,
            db_path: env_or("HABITS_DB_PATH", "habits.db").into(),
            session_secret: env_or("HABITS_SESSION_SECRET", "dev-secret-change-me"),
            secure_cookies: matches!(
                env_or("HABITS_SECURE_COOKIES", "false").to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }

    pub fn has_placeholder_secret(&self) -> bool {
        self.session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.session_secret.as_str())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> Config {
        Config {
            addr: "127.0.0.1:8080".parse().unwrap(),
            db_path: "habits.db".into(),
            session_secret: secret.into(),
            secure_cookies: false,
            store_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn placeholder_secrets_are_flagged() {
        assert!(config("").has_placeholder_secret());
        assert!(config("dev-secret-change-me").has_placeholder_secret());
        assert!(!config("4f1c9e0a7d2b").has_placeholder_secret());
    }
}
