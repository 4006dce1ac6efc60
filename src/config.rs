//! Configuration parsing and validation for the analysis server
//!
//! This module handles command-line argument parsing and validation using clap. The API key, base
//! URL and model can also come from the environment; `main` loads a `.env` file before parsing.
use anyhow::anyhow;
use clap::Parser;
use idea_analysis::{
    auth::ApiKey,
    client::PoolSettings,
    completion::{CompletionSettings, DEFAULT_BASE_URL, DEFAULT_MODEL},
};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The address the server binds to.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// The port on which the server will listen.
    #[arg(short = 'p', long, default_value_t = 8000)]
    pub port: u16,

    /// API key for the completion service.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: ApiKey,

    /// Base URL of the OpenAI-compatible completion service.
    #[arg(long, env = "COMPLETION_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// The model to request completions from.
    #[arg(long, env = "COMPLETION_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// How long (in seconds) to wait for the completion service before giving up.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// The port on which the metrics server will listen.
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,

    /// Whether to enable the metrics endpoint.
    #[arg(short = 'm', long, default_value_t = true)]
    pub metrics: bool,

    /// The prefix to use for metrics.
    #[arg(long, default_value = "idea_analysis")]
    pub metrics_prefix: String,

    /// Maximum number of idle HTTP connections to keep alive per upstream host.
    #[arg(long, default_value_t = 100)]
    pub pool_max_idle_per_host: usize,

    /// How long (in seconds) to keep idle HTTP connections alive.
    /// 90s balances connection reuse with avoiding stale connections.
    #[arg(long, default_value_t = 90)]
    pub pool_idle_timeout_secs: u64,
}

impl Config {
    pub fn validate(self) -> Result<Self, anyhow::Error> {
        if self.api_key.is_blank() {
            return Err(anyhow!(
                "API key not found. Set API_KEY in the environment or the .env file."
            ));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("--timeout-secs must be greater than zero"));
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings::builder()
            .base_url(self.base_url.clone())
            .api_key(self.api_key.clone())
            .model(self.model.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_idle_per_host: self.pool_max_idle_per_host,
            idle_timeout: Duration::from_secs(self.pool_idle_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("idea-analysis").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--api-key", "sk-test"]).validate().unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.base_url.as_str(), "https://api.aimlapi.com/");
        assert_eq!(config.model, "gpt-4");

        let settings = config.completion_settings();
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert_eq!(settings.api_key, ApiKey::new("sk-test"));
    }

    #[test]
    fn test_blank_api_key_rejected() {
        assert!(parse(&["--api-key", "  "]).validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(
            parse(&["--api-key", "sk-test", "--timeout-secs", "0"])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = parse(&["--api-key", "sk-very-secret"]);
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
