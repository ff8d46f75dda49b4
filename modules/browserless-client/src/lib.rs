pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

/// Extra time granted to the HTTP round trip on top of the navigation timeout,
/// so Browserless gets to report its own 408 before we give up locally.
const TRANSPORT_SLACK: Duration = Duration::from_secs(10);

/// Upstream proxy the remote browser should route through.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub server: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Per-session options sent along with every `/content` call.
#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub timeout: Duration,
    pub wait_until: String,
    pub locale: Option<String>,
    pub proxy: Option<ProxyConfig>,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            wait_until: "domcontentloaded".to_string(),
            locale: None,
            proxy: None,
        }
    }
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    options: ContentOptions,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>, options: ContentOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout + TRANSPORT_SLACK)
            .build()
            .map_err(|e| BrowserlessError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            options,
        })
    }

    pub fn options(&self) -> &ContentOptions {
        &self.options
    }

    /// Fetch fully-rendered HTML content for a URL via the Browserless /content endpoint.
    /// Every call runs in a fresh browser session; nothing is shared between calls.
    pub async fn content(&self, url: &str) -> Result<String> {
        let endpoint = self.endpoint()?;
        let body = request_body(url, &self.options);

        debug!(url, endpoint = %redact(&endpoint), "browserless: POST /content");

        let resp = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::REQUEST_TIMEOUT {
            return Err(BrowserlessError::Timeout(format!(
                "navigation to {url} exceeded {}ms",
                self.options.timeout.as_millis()
            )));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    fn endpoint(&self) -> Result<url::Url> {
        let mut endpoint = url::Url::parse(&format!("{}/content", self.base_url))
            .map_err(|e| BrowserlessError::Config(format!("bad base url {}: {e}", self.base_url)))?;
        {
            let mut query = endpoint.query_pairs_mut();
            if let Some(ref token) = self.token {
                query.append_pair("token", token);
            }
            query.append_pair("timeout", &self.options.timeout.as_millis().to_string());
            if let Some(launch) = launch_options(&self.options) {
                query.append_pair("launch", &launch.to_string());
            }
        }
        Ok(endpoint)
    }
}

fn request_body(url: &str, options: &ContentOptions) -> Value {
    let mut body = json!({
        "url": url,
        "gotoOptions": {
            "timeout": options.timeout.as_millis() as u64,
            "waitUntil": options.wait_until,
        },
    });

    if let Some(ref locale) = options.locale {
        body["setExtraHTTPHeaders"] = json!({ "Accept-Language": locale });
    }

    if let Some(ProxyConfig {
        username: Some(username),
        password: Some(password),
        ..
    }) = &options.proxy
    {
        body["authenticate"] = json!({ "username": username, "password": password });
    }

    body
}

fn launch_options(options: &ContentOptions) -> Option<Value> {
    let proxy = options.proxy.as_ref()?;
    Some(json!({ "args": [format!("--proxy-server={}", proxy.server)] }))
}

fn redact(endpoint: &url::Url) -> String {
    let mut shown = endpoint.clone();
    shown.set_query(None);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(options: ContentOptions) -> BrowserlessClient {
        BrowserlessClient::new("https://chrome.example.com/", Some("secret"), options).unwrap()
    }

    #[test]
    fn body_carries_navigation_timeout_and_wait_condition() {
        let options = ContentOptions {
            timeout: Duration::from_secs(15),
            ..Default::default()
        };
        let body = request_body("https://example.com", &options);
        assert_eq!(body["url"], "https://example.com");
        assert_eq!(body["gotoOptions"]["timeout"], 15000);
        assert_eq!(body["gotoOptions"]["waitUntil"], "domcontentloaded");
        assert!(body.get("authenticate").is_none());
    }

    #[test]
    fn proxy_credentials_go_into_authenticate() {
        let options = ContentOptions {
            proxy: Some(ProxyConfig {
                server: "http://proxy.example.com:8000".into(),
                username: Some("user".into()),
                password: Some("pass".into()),
            }),
            ..Default::default()
        };
        let body = request_body("https://yandex.ru/search/?text=x", &options);
        assert_eq!(body["authenticate"]["username"], "user");
        assert_eq!(body["authenticate"]["password"], "pass");

        let launch = launch_options(&options).unwrap();
        assert_eq!(launch["args"][0], "--proxy-server=http://proxy.example.com:8000");
    }

    #[test]
    fn locale_becomes_accept_language_header() {
        let options = ContentOptions {
            locale: Some("ru-RU".into()),
            ..Default::default()
        };
        let body = request_body("https://example.com", &options);
        assert_eq!(body["setExtraHTTPHeaders"]["Accept-Language"], "ru-RU");
    }

    #[test]
    fn endpoint_includes_token_and_timeout() {
        let endpoint = client(ContentOptions::default()).endpoint().unwrap();
        assert_eq!(endpoint.path(), "/content");
        let pairs: Vec<(String, String)> = endpoint
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("token".into(), "secret".into())));
        assert!(pairs.contains(&("timeout".into(), "30000".into())));
    }

    #[test]
    fn redacted_endpoint_hides_token() {
        let endpoint = client(ContentOptions::default()).endpoint().unwrap();
        assert!(!redact(&endpoint).contains("secret"));
    }
}
