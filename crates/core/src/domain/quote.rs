use serde::{Deserialize, Serialize};

/// Normalized quote returned to the caller. Every field has a defined
/// fallback, so normalization is total (see `quotes::normalize`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub open: f64,
    pub previous_close: f64,
    pub currency: String,
}

/// Raw provider payload for one (symbol, suffix) attempt. Providers populate
/// these fields inconsistently depending on market session state, so every
/// field is optional and the interesting policy lives in normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteCandidate {
    pub regular_market_price: Option<f64>,
    pub current_price: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    /// Most recent day's bar, when the provider includes history.
    pub history: Option<DayBar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayBar {
    pub open: Option<f64>,
    pub close: Option<f64>,
}

impl QuoteCandidate {
    /// A candidate is only accepted when it carries a live or near-live
    /// price field; history alone is not enough to claim the venue matched.
    pub fn has_price_signal(&self) -> bool {
        self.regular_market_price.is_some() || self.current_price.is_some()
    }
}
