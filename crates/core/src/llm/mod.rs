pub mod error;
pub mod extract;
pub mod openai;
pub mod prompt;

/// A rendered system + user prompt pair, ready to send.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one chat-completion request and return the assistant's raw text
    /// verbatim. The credential is per-call because it may come from the
    /// incoming request rather than process configuration.
    async fn complete(&self, api_key: &str, prompt: &ChatPrompt) -> anyhow::Result<String>;
}
