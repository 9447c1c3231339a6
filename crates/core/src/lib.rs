pub mod domain;
pub mod llm;
pub mod quotes;

pub mod config {
    use anyhow::Context;
    use serde::Deserialize;
    use std::path::Path;

    /// Process environment, read once at startup.
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub quote_provider_base_url: Option<String>,
        pub quote_provider_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                quote_provider_base_url: std::env::var("QUOTE_PROVIDER_BASE_URL").ok(),
                quote_provider_api_key: std::env::var("QUOTE_PROVIDER_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_quote_provider_base_url(&self) -> anyhow::Result<&str> {
            self.quote_provider_base_url
                .as_deref()
                .context("QUOTE_PROVIDER_BASE_URL is required")
        }
    }

    /// File-based configuration: model selection and prompt templates.
    /// Loaded once at startup and passed by reference into the request path.
    #[derive(Debug, Clone, Deserialize)]
    pub struct AppConfig {
        pub model: ModelConfig,
        pub prompts: PromptConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ModelConfig {
        pub name: String,
        pub temperature: f64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct PromptConfig {
        pub system: String,
        /// User-prompt template; `{user_input}` is replaced with the rendered
        /// instructions + portfolio block.
        pub analysis_template: String,
    }

    impl AppConfig {
        pub fn load(path: &Path) -> anyhow::Result<Self> {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse config file {}", path.display()))
        }
    }

}
