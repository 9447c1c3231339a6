use crate::config::Settings;
use crate::domain::quote::QuoteCandidate;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const QUOTE_PATH: &str = "/v1/quote";

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the raw payload for one fully-suffixed symbol. Any transport,
    /// status, or decode problem is an error; the resolver decides what to
    /// do with it.
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteCandidate>;
}

#[derive(Debug, Clone)]
pub struct HttpQuoteProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpQuoteProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_quote_provider_base_url()?.to_string();
        let api_key = settings.quote_provider_api_key.clone();

        let timeout_secs = std::env::var("QUOTE_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build quote provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build quote provider http client")?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: None,
        })
    }

    fn url(&self, symbol: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            QUOTE_PATH,
            symbol
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for HttpQuoteProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteCandidate> {
        let url = self.url(symbol);
        let headers = self.headers()?;

        let res = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .context("quote provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read quote provider response")?;

        if !status.is_success() {
            anyhow::bail!("quote provider HTTP {status}: {text}");
        }

        serde_json::from_str::<QuoteCandidate>(&text)
            .with_context(|| format!("quote provider response is not valid JSON: {text}"))
    }
}
