use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Secrets and endpoints loaded from environment variables.
/// Tunables (limits, TTLs, concurrency) live in the TOML [`FileConfig`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database (in-memory cache when unset)
    pub database_url: Option<String>,

    // Auth
    pub api_token: String,

    // Remote browser
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Yandex upstream proxy
    pub yandex_proxy_url: Option<String>,
    pub yandex_proxy_username: Option<String>,
    pub yandex_proxy_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: optional_env("DATABASE_URL"),
            api_token: std::env::var("HARVEST_API_TOKEN")
                .context("HARVEST_API_TOKEN environment variable is required")?,
            browserless_url: std::env::var("BROWSERLESS_URL")
                .context("BROWSERLESS_URL environment variable is required")?,
            browserless_token: optional_env("BROWSERLESS_TOKEN"),
            yandex_proxy_url: optional_env("YANDEX_PROXY_URL"),
            yandex_proxy_username: optional_env("YANDEX_PROXY_USERNAME"),
            yandex_proxy_password: optional_env("YANDEX_PROXY_PASSWORD"),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.chars().count().min(5);
            let head: String = val.chars().take(n).collect();
            format!("{head}...({} chars)", val.chars().count())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", if self.database_url.is_some() { "<set>" } else { "<not set, using in-memory cache>" });
        tracing::info!("  HARVEST_API_TOKEN: {}", preview(&self.api_token));
        tracing::info!("  BROWSERLESS_URL: {}", self.browserless_url);
        tracing::info!("  BROWSERLESS_TOKEN: {}", preview_opt(&self.browserless_token));
        tracing::info!("  YANDEX_PROXY_URL: {}", preview_opt(&self.yandex_proxy_url));
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// TOML-backed tunables. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub cache: CacheConfig,
    pub gateway: GatewayConfig,
    pub serp: SerpDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_queries: usize,
    pub max_pages_per_query: u32,
    pub max_site_pages: u32,
    pub max_html_chars_per_page: usize,
    pub max_title_chars: usize,
    pub max_snippet_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_queries: 5,
            max_pages_per_query: 5,
            max_site_pages: 4,
            max_html_chars_per_page: 800_000,
            max_title_chars: 512,
            max_snippet_chars: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,
            sweep_interval_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub page_timeout_secs: u64,
    pub site_max_concurrency: usize,
    pub google_max_concurrency: usize,
    pub yandex_max_concurrency: usize,
    pub wait_until: String,
}

impl GatewayConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 15,
            site_max_concurrency: 5,
            google_max_concurrency: 5,
            yandex_max_concurrency: 3,
            wait_until: "domcontentloaded".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerpDefaults {
    pub default_locale: String,
    pub default_geo: String,
    pub default_yandex_region: String,
}

impl Default for SerpDefaults {
    fn default() -> Self {
        Self {
            default_locale: "ru-RU".to_string(),
            default_geo: "ru".to_string(),
            default_yandex_region: "213".to_string(),
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<FileConfig> {
    Ok(toml::from_str(content)?)
}
