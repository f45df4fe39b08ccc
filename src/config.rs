//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PRICE_ENDPOINT: &str = "http://127.0.0.1:3000/api/price";
pub const DEFAULT_BITQUERY_HTTP_URL: &str = "https://streaming.bitquery.io/graphql";
pub const DEFAULT_BITQUERY_WS_URL: &str = "wss://streaming.bitquery.io/graphql";
pub const DEFAULT_CHAT_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "sonar-medium-online";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,*";

pub const BITQUERY_TOKEN: &str = "BITQUERY_TOKEN";
pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP gateway binds to.
    pub bind_addr: SocketAddr,
    /// Origins allowed by CORS. `*` (or an empty list) allows any origin.
    pub cors_origins: Vec<String>,
    /// REST endpoint the price client reads its first value from.
    pub price_endpoint: String,
    /// Bitquery GraphQL over HTTP.
    pub bitquery_http_url: String,
    /// Bitquery GraphQL subscriptions (graphql-ws).
    pub bitquery_ws_url: String,
    pub bitquery_token: Option<String>,
    pub chat_api_url: String,
    pub chat_model: String,
    pub perplexity_api_key: Option<String>,
    pub feed: FeedConfig,
    /// How long a market analysis stays cached.
    pub analysis_ttl: Duration,
}

/// Settings for a single price client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub ws_url: String,
    pub token: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Bound on TCP + WebSocket upgrade.
    pub open_timeout: Duration,
    /// Silence on an open connection longer than this counts as a drop.
    pub idle_timeout: Option<Duration>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_BITQUERY_WS_URL.to_string(),
            token: String::new(),
            max_attempts: 3,
            base_delay: Duration::from_millis(5_000),
            open_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl FeedConfig {
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..self.clone()
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let bind_addr = parse_var(
            "BIND_ADDR",
            &get_or("BIND_ADDR", DEFAULT_BIND_ADDR),
        )?;
        let cors_origins = get_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let bitquery_token = get(BITQUERY_TOKEN);
        let bitquery_ws_url = get_or("BITQUERY_WS_URL", DEFAULT_BITQUERY_WS_URL);

        let max_attempts: u32 = parse_var(
            "RECONNECT_MAX_ATTEMPTS",
            &get_or("RECONNECT_MAX_ATTEMPTS", "3"),
        )?;
        let base_delay_ms: u64 = parse_var(
            "RECONNECT_BASE_DELAY_MS",
            &get_or("RECONNECT_BASE_DELAY_MS", "5000"),
        )?;
        let open_timeout_secs: u64 =
            parse_var("OPEN_TIMEOUT_SECS", &get_or("OPEN_TIMEOUT_SECS", "10"))?;
        let idle_timeout_secs: u64 =
            parse_var("IDLE_TIMEOUT_SECS", &get_or("IDLE_TIMEOUT_SECS", "60"))?;
        let analysis_cache_secs: u64 =
            parse_var("ANALYSIS_CACHE_SECS", &get_or("ANALYSIS_CACHE_SECS", "60"))?;

        if open_timeout_secs == 0 {
            return Err(AppError::Config("OPEN_TIMEOUT_SECS must be > 0".into()));
        }

        let feed = FeedConfig {
            ws_url: bitquery_ws_url.clone(),
            token: bitquery_token.clone().unwrap_or_default(),
            max_attempts,
            base_delay: Duration::from_millis(base_delay_ms),
            open_timeout: Duration::from_secs(open_timeout_secs),
            idle_timeout: (idle_timeout_secs > 0).then(|| Duration::from_secs(idle_timeout_secs)),
        };

        Ok(Self {
            bind_addr,
            cors_origins,
            price_endpoint: get_or("PRICE_ENDPOINT", DEFAULT_PRICE_ENDPOINT),
            bitquery_http_url: get_or("BITQUERY_HTTP_URL", DEFAULT_BITQUERY_HTTP_URL),
            bitquery_ws_url,
            bitquery_token,
            chat_api_url: get_or("CHAT_API_URL", DEFAULT_CHAT_API_URL),
            chat_model: get_or("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            perplexity_api_key: get(PERPLEXITY_API_KEY),
            feed,
            analysis_ttl: Duration::from_secs(analysis_cache_secs),
        })
    }

    pub fn require_bitquery_token(&self) -> Result<&str> {
        require_secret(BITQUERY_TOKEN, self.bitquery_token.as_deref())
    }
}

/// A secret that must be present; `name` is the variable it is read from.
pub fn require_secret<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| AppError::Config(format!("{name} is not set")))
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::Config(format!("{key} is invalid ({raw}): {e}")))
}
