//! Combines observed records with an optional prediction into one plotting sequence

use crate::models::series::{PlottingPoint, Prediction, PriceRecord};

/// Build the render-ready sequence.
///
/// Records are copied in order. A prediction is appended as a single close-only
/// point dated `horizon` days after the last record; with no records there is no
/// anchor date and the prediction is left out.
pub fn merge(records: &[PriceRecord], prediction: Option<&Prediction>) -> Vec<PlottingPoint> {
    let mut points: Vec<PlottingPoint> = Vec::with_capacity(records.len() + 1);
    points.extend(records.iter().map(PlottingPoint::observed));

    let anchor = records.last().map(|r| r.date);
    if let (Some(last_date), Some(prediction)) = (anchor, prediction) {
        if let Some(date) = prediction.horizon.project_from(last_date) {
            points.push(PlottingPoint::predicted(date, prediction.predicted_close));
        }
    }

    points
}
