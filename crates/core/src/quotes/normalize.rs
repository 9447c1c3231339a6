use crate::domain::quote::{Quote, QuoteCandidate};

/// Collapse a heterogeneous provider payload into a `Quote`.
///
/// The priority chains matter: providers populate different price fields
/// depending on market session state (pre-market, live, closed), so
/// `currentPrice` must win over `regularMarketPrice`, which must win over
/// the last history close. Total function; every field has a fallback.
pub fn normalize(candidate: &QuoteCandidate, resolved_symbol: &str, display_symbol: &str) -> Quote {
    let history_open = candidate.history.as_ref().and_then(|bar| bar.open);
    let history_close = candidate.history.as_ref().and_then(|bar| bar.close);

    let price = candidate
        .current_price
        .or(candidate.regular_market_price)
        .or(history_close)
        .unwrap_or(0.0);

    let open = candidate.open.or(history_open).unwrap_or(0.0);

    let name = first_non_empty(&candidate.short_name, &candidate.long_name)
        .unwrap_or_else(|| display_symbol.to_string());

    // "USD" only covers an absent key; a provider-supplied value passes
    // through untouched, even when empty.
    let currency = candidate
        .currency
        .clone()
        .unwrap_or_else(|| "USD".to_string());

    Quote {
        symbol: resolved_symbol.to_string(),
        name,
        price,
        open,
        previous_close: candidate.previous_close.unwrap_or(0.0),
        currency,
    }
}

fn first_non_empty(a: &Option<String>, b: &Option<String>) -> Option<String> {
    [a, b]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
}
