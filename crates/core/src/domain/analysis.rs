use serde::{Deserialize, Serialize};

/// Structured verdict recovered from the model's free-text reply.
/// Always produced: even a total parse failure yields `score = 0` with the
/// raw text as `reasoning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: i64,
    pub reasoning: String,
}
