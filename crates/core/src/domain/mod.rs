pub mod analysis;
pub mod portfolio;
pub mod quote;
