//! HTTP surface for the series pipeline

pub mod http;

pub use http::*;
