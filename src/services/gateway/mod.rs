//! Remote data service adapter

pub mod client;
pub mod messages;

pub use client::HttpMarketDataGateway;
