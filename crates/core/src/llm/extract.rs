use crate::domain::analysis::AnalysisResult;
use regex::Regex;
use std::sync::OnceLock;

// A single flat JSON object carrying both contract keys. `[^{}]` keeps the
// match free of nested braces, so a response with an object nested inside
// the JSON falls through to the later tiers.
const SCOPED_OBJECT_PATTERN: &str = r#"\{[^{}]*"score"[^{}]*"reasoning"[^{}]*\}"#;
const SCORE_FIELD_PATTERN: &str = r#""score"\s*:\s*(\d+)"#;
const REASONING_FIELD_PATTERN: &str = r#"(?s)"reasoning"\s*:\s*"([^"]*)""#;

fn scoped_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SCOPED_OBJECT_PATTERN).unwrap())
}

fn score_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SCORE_FIELD_PATTERN).unwrap())
}

fn reasoning_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REASONING_FIELD_PATTERN).unwrap())
}

/// Recover a structured result from the model's raw reply. Total function:
/// three strategies of decreasing strictness are tried in fixed order and
/// the last one always produces a value.
///
/// 1. Parse the first flat `{... "score" ... "reasoning" ...}` substring.
/// 2. Only when no such substring exists, parse the whole text as JSON
///    (covers pure-JSON replies the scoped pattern misses, e.g. with
///    nested structures).
/// 3. Scavenge `score` / `reasoning` fields individually; an absent
///    `reasoning` falls back to the entire raw text so nothing is dropped.
pub fn extract(raw: &str) -> AnalysisResult {
    let structured = match scoped_object_re().find(raw) {
        Some(m) => parse_structured(m.as_str()),
        None => parse_structured(raw),
    };

    structured.unwrap_or_else(|| scavenge_fields(raw))
}

// Both keys are required here; a JSON document missing either is treated as
// a parse failure and handed to the field-level fallback, which always
// fills both.
fn parse_structured(text: &str) -> Option<AnalysisResult> {
    serde_json::from_str::<AnalysisResult>(text).ok()
}

fn scavenge_fields(raw: &str) -> AnalysisResult {
    let score = score_field_re()
        .captures(raw)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .unwrap_or(0);

    let reasoning = reasoning_field_re()
        .captures(raw)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| raw.to_string());

    AnalysisResult { score, reasoning }
}
