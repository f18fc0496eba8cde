//! Chart projections over the merged series

use super::merger::merge;
use super::store::SeriesSnapshot;
use crate::error::ViewError;
use crate::models::series::{LinePoint, PlottingPoint, Prediction, PriceRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Candlestick,
    Line,
}

impl ChartKind {
    pub fn toggle(self) -> Self {
        match self {
            ChartKind::Candlestick => ChartKind::Line,
            ChartKind::Line => ChartKind::Candlestick,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Candlestick => "Candlestick Chart",
            ChartKind::Line => "Line Chart (Close Price)",
        }
    }
}

impl FromStr for ChartKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "candlestick" | "candle" | "ohlc" => Ok(ChartKind::Candlestick),
            "line" => Ok(ChartKind::Line),
            other => Err(ViewError::invalid_request(format!(
                "Unknown chart kind '{}' (expected 'candlestick' or 'line')",
                other
            ))),
        }
    }
}

/// A projection shaped for one chart type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum ProjectedSeries {
    Candlestick(Vec<PlottingPoint>),
    Line(Vec<LinePoint>),
}

impl ProjectedSeries {
    pub fn len(&self) -> usize {
        match self {
            ProjectedSeries::Candlestick(points) => points.len(),
            ProjectedSeries::Line(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merged series with read-only projections.
///
/// Computed from store data; selecting a projection never touches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesView {
    points: Vec<PlottingPoint>,
}

impl SeriesView {
    pub fn new(records: &[PriceRecord], prediction: Option<&Prediction>) -> Self {
        Self {
            points: merge(records, prediction),
        }
    }

    pub fn from_snapshot(snapshot: &SeriesSnapshot) -> Self {
        Self::new(&snapshot.records, snapshot.prediction.as_ref())
    }

    /// OHLC points with the predicted flag, as stored
    pub fn as_candlestick(&self) -> &[PlottingPoint] {
        &self.points
    }

    pub fn line_points(&self) -> impl Iterator<Item = LinePoint> + '_ {
        self.points.iter().map(LinePoint::from)
    }

    pub fn as_line_series(&self) -> Vec<LinePoint> {
        self.line_points().collect()
    }

    pub fn render(&self, kind: ChartKind) -> ProjectedSeries {
        match kind {
            ChartKind::Candlestick => ProjectedSeries::Candlestick(self.points.clone()),
            ChartKind::Line => ProjectedSeries::Line(self.as_line_series()),
        }
    }

    pub fn predicted_point(&self) -> Option<&PlottingPoint> {
        self.points.last().filter(|p| p.predicted)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
