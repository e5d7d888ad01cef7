use std::time::Duration;

use url::Url;

use crate::logging::{LogLevel, Logger};

const DEFAULT_GITHUB_USER: &str = "Shivasaikgp";
const DEFAULT_API_BASE_URL: &str = "https://api.github.com/";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_IDLE_FALLBACK_DELAY_MS: u64 = 100;
const DEFAULT_MILESTONE_DEBOUNCE_MS: u64 = 150;
const DEFAULT_SUBMIT_DELAY_MS: u64 = 2_000;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const FETCH_TIMEOUT_MS_BOUNDS: (u64, u64) = (500, 60_000);
const IDLE_FALLBACK_DELAY_MS_BOUNDS: (u64, u64) = (0, 5_000);
const MILESTONE_DEBOUNCE_MS_BOUNDS: (u64, u64) = (0, 2_000);
const SUBMIT_DELAY_MS_BOUNDS: (u64, u64) = (0, 10_000);

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub github_user: String,
    pub api_base_url: Url,
    pub fetch_timeout: Duration,
    pub idle_fallback_delay: Duration,
    pub milestone_debounce: Duration,
    pub contact_endpoint: Option<Url>,
    pub submit_delay: Duration,
    pub log_level: LogLevel,
}

impl RuntimeConfig {
    /// Resolves every key through `lookup`; anything missing, unparsable or
    /// out of bounds keeps its default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let github_user = parse_non_empty_string(lookup("PORTFOLIO_GITHUB_USER"))
            .unwrap_or_else(|| DEFAULT_GITHUB_USER.to_string());
        let api_base_url = parse_http_url(lookup("PORTFOLIO_API_BASE_URL")).unwrap_or_else(default_api_base_url);
        let fetch_timeout_ms = parse_u64_with_bounds(
            lookup("PORTFOLIO_FETCH_TIMEOUT_MS"),
            DEFAULT_FETCH_TIMEOUT_MS,
            FETCH_TIMEOUT_MS_BOUNDS,
        );
        let idle_fallback_delay_ms = parse_u64_with_bounds(
            lookup("PORTFOLIO_IDLE_FALLBACK_DELAY_MS"),
            DEFAULT_IDLE_FALLBACK_DELAY_MS,
            IDLE_FALLBACK_DELAY_MS_BOUNDS,
        );
        let milestone_debounce_ms = parse_u64_with_bounds(
            lookup("PORTFOLIO_MILESTONE_DEBOUNCE_MS"),
            DEFAULT_MILESTONE_DEBOUNCE_MS,
            MILESTONE_DEBOUNCE_MS_BOUNDS,
        );
        let submit_delay_ms = parse_u64_with_bounds(
            lookup("PORTFOLIO_SUBMIT_DELAY_MS"),
            DEFAULT_SUBMIT_DELAY_MS,
            SUBMIT_DELAY_MS_BOUNDS,
        );
        let contact_endpoint = parse_http_url(lookup("PORTFOLIO_CONTACT_ENDPOINT"));
        let log_level = parse_non_empty_string(lookup("PORTFOLIO_LOG_LEVEL"))
            .and_then(|value| LogLevel::parse(&value))
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Self {
            github_user,
            api_base_url,
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            idle_fallback_delay: Duration::from_millis(idle_fallback_delay_ms),
            milestone_debounce: Duration::from_millis(milestone_debounce_ms),
            contact_endpoint,
            submit_delay: Duration::from_millis(submit_delay_ms),
            log_level,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Browser builds have no process environment; values are baked in by
    /// the build (`PORTFOLIO_GITHUB_USER=... trunk build`).
    #[cfg(target_arch = "wasm32")]
    pub fn from_build_env() -> Self {
        Self::from_lookup(|key| {
            let value = match key {
                "PORTFOLIO_GITHUB_USER" => option_env!("PORTFOLIO_GITHUB_USER"),
                "PORTFOLIO_API_BASE_URL" => option_env!("PORTFOLIO_API_BASE_URL"),
                "PORTFOLIO_FETCH_TIMEOUT_MS" => option_env!("PORTFOLIO_FETCH_TIMEOUT_MS"),
                "PORTFOLIO_IDLE_FALLBACK_DELAY_MS" => option_env!("PORTFOLIO_IDLE_FALLBACK_DELAY_MS"),
                "PORTFOLIO_MILESTONE_DEBOUNCE_MS" => option_env!("PORTFOLIO_MILESTONE_DEBOUNCE_MS"),
                "PORTFOLIO_CONTACT_ENDPOINT" => option_env!("PORTFOLIO_CONTACT_ENDPOINT"),
                "PORTFOLIO_SUBMIT_DELAY_MS" => option_env!("PORTFOLIO_SUBMIT_DELAY_MS"),
                "PORTFOLIO_LOG_LEVEL" => option_env!("PORTFOLIO_LOG_LEVEL"),
                _ => None,
            };
            value.map(ToString::to_string)
        })
    }

    pub fn logger(&self) -> Logger {
        Logger::new(self.log_level)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

fn parse_u64_with_bounds(value: Option<String>, default: u64, bounds: (u64, u64)) -> u64 {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

pub(crate) fn parse_non_empty_string(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_http_url(value: Option<String>) -> Option<Url> {
    let value = parse_non_empty_string(value)?;
    let parsed = Url::parse(&value).ok()?;

    if parsed.scheme() == "http" || parsed.scheme() == "https" {
        Some(parsed)
    } else {
        None
    }
}
