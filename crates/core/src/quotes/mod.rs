pub mod normalize;
pub mod provider;
pub mod resolver;

pub use provider::{HttpQuoteProvider, QuoteProvider};
pub use resolver::{NotFoundError, TickerResolver};
