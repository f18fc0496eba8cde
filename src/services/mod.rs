//! External service adapters

pub mod gateway;
pub mod market_data;

pub use gateway::HttpMarketDataGateway;
pub use market_data::{HistorySnapshot, MarketDataGateway};
