//! Series fetch-and-render pipeline: store, controller, merger and projections.

pub mod controller;
pub mod merger;
pub mod projection;
pub mod store;

pub use controller::FetchController;
pub use merger::merge;
pub use projection::{ChartKind, ProjectedSeries, SeriesView};
pub use store::{SeriesSnapshot, SeriesStatus, SeriesStore};
