//! Series data models: symbols, windows, price records, statistics and predictions

use crate::error::ViewError;
use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized (trimmed, upper-cased) ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, ViewError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ViewError::invalid_request("Symbol must not be empty"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(ViewError::invalid_request(format!(
                "Symbol '{}' must not contain whitespace",
                normalized
            )));
        }
        Ok(Self(normalized))
    }

    pub(crate) fn new_unchecked(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ViewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Supported lookback windows, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Window {
    OneMonth,
    SixtyDays,
    #[default]
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl Window {
    pub const ALL: [Window; 5] = [
        Window::SixtyDays,
        Window::OneMonth,
        Window::ThreeMonths,
        Window::SixMonths,
        Window::OneYear,
    ];

    pub fn from_days(days: u32) -> Result<Self, ViewError> {
        match days {
            30 => Ok(Window::OneMonth),
            60 => Ok(Window::SixtyDays),
            90 => Ok(Window::ThreeMonths),
            180 => Ok(Window::SixMonths),
            365 => Ok(Window::OneYear),
            other => Err(ViewError::invalid_request(format!(
                "Unsupported window of {} days (expected one of 30, 60, 90, 180, 365)",
                other
            ))),
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Window::OneMonth => 30,
            Window::SixtyDays => 60,
            Window::ThreeMonths => 90,
            Window::SixMonths => 180,
            Window::OneYear => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::OneMonth => "1 Month",
            Window::SixtyDays => "60 Days",
            Window::ThreeMonths => "3 Months",
            Window::SixMonths => "6 Months",
            Window::OneYear => "1 Year",
        }
    }
}

impl TryFrom<u32> for Window {
    type Error = ViewError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Window::from_days(days)
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        window.days()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

/// Forward distance of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    #[default]
    Day,
    Month,
}

impl Horizon {
    pub const ALL: [Horizon; 2] = [Horizon::Day, Horizon::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Day => "day",
            Horizon::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::Day => "Next Day",
            Horizon::Month => "Next Month",
        }
    }

    /// Calendar days between the last observation and the predicted point
    pub fn offset_days(&self) -> u64 {
        match self {
            Horizon::Day => 1,
            Horizon::Month => 30,
        }
    }

    pub fn project_from(&self, last: NaiveDate) -> Option<NaiveDate> {
        last.checked_add_days(Days::new(self.offset_days()))
    }
}

impl FromStr for Horizon {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Horizon::Day),
            "month" => Ok(Horizon::Month),
            other => Err(ViewError::invalid_request(format!(
                "Unsupported horizon '{}' (expected 'day' or 'month')",
                other
            ))),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trading day's observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn has_valid_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the date
fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub current: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening: Option<f64>,
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
    pub change: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub average: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub positive_days: u32,
    pub negative_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_daily_change: Option<f64>,
}

/// Server-computed aggregate over the record set. Kept verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_stats: Option<PriceStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_stats: Option<VolumeStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_stats: Option<PerformanceStats>,
}

/// Forward estimate for the current symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_close: f64,
    pub horizon: Horizon,
}

impl Prediction {
    pub fn new(predicted_close: f64, horizon: Horizon) -> Self {
        Self {
            predicted_close,
            horizon,
        }
    }
}

/// Render-ready point; predicted points carry only `close`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottingPoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
    pub predicted: bool,
}

impl PlottingPoint {
    pub fn observed(record: &PriceRecord) -> Self {
        Self {
            date: record.date,
            open: Some(record.open),
            high: Some(record.high),
            low: Some(record.low),
            close: record.close,
            volume: Some(record.volume),
            predicted: false,
        }
    }

    pub fn predicted(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            predicted: true,
        }
    }
}

/// Close-price point for line charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub predicted: bool,
}

impl From<&PlottingPoint> for LinePoint {
    fn from(point: &PlottingPoint) -> Self {
        Self {
            date: point.date,
            close: point.close,
            predicted: point.predicted,
        }
    }
}
