use crate::domain::quote::Quote;
use crate::quotes::normalize::normalize;
use crate::quotes::provider::QuoteProvider;
use std::fmt;
use std::sync::Arc;

/// Venue suffixes tried in order: unsuffixed (US listings), then NSE, then
/// BSE. Earlier position wins; this is a fixed policy, not a best-match
/// search, so the list must stay ordered and the attempts sequential.
const SUFFIX_CANDIDATES: [&str; 3] = ["", ".NS", ".BO"];

/// No suffix candidate produced a usable quote. Carries the original
/// uppercased, unsuffixed symbol for the caller-facing message.
#[derive(Debug, Clone)]
pub struct NotFoundError {
    pub symbol: String,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stock not found: {}", self.symbol)
    }
}

impl std::error::Error for NotFoundError {}

pub struct TickerResolver {
    provider: Arc<dyn QuoteProvider>,
}

impl TickerResolver {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a raw symbol by trying each venue suffix in order and
    /// accepting the first payload with a live price signal. Per-attempt
    /// failures are absorbed; only exhaustion surfaces as an error.
    pub async fn resolve(&self, raw: &str) -> Result<Quote, NotFoundError> {
        let display = raw.trim().to_uppercase();

        for suffix in SUFFIX_CANDIDATES {
            let full = format!("{display}{suffix}");

            let candidate = match self.provider.fetch_quote(&full).await {
                Ok(candidate) => candidate,
                Err(err) => {
                    tracing::debug!(symbol = %full, error = %err, "quote attempt failed; trying next venue");
                    continue;
                }
            };

            if !candidate.has_price_signal() {
                tracing::debug!(symbol = %full, "payload has no live price signal; trying next venue");
                continue;
            }

            return Ok(normalize(&candidate, &full, &display));
        }

        Err(NotFoundError { symbol: display })
    }
}
