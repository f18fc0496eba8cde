//! Shared data models for the series pipeline.

pub mod series;

pub use series::{
    DateRange, Horizon, LinePoint, PerformanceStats, PlottingPoint, Prediction, PriceRecord,
    PriceStats, Statistics, Symbol, VolumeStats, Window,
};
