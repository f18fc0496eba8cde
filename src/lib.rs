//! Series fetch-and-render pipeline for the stock prediction viewer.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod series;
pub mod services;
