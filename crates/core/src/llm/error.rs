use std::fmt;

/// Transport or decode failure on the chat-completion call. Parse
/// irregularities in the model's text are NOT errors; those are handled by
/// the tolerant extractor. This type only covers the call itself failing.
#[derive(Debug, Clone)]
pub struct LlmCallError {
    pub stage: &'static str,
    pub detail: String,
    pub raw_body: Option<String>,
}

impl fmt::Display for LlmCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LLM error (stage={}): {}", self.stage, self.detail)
    }
}

impl std::error::Error for LlmCallError {}
