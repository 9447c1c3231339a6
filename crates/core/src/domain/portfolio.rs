use serde::{Deserialize, Serialize};

/// One caller-supplied holding. Used only to render the analysis prompt;
/// no normalization is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioLine {
    pub ticker: String,
    pub quantity: f64,
    pub price: f64,
}
