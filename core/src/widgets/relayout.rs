// Plotly relayout payloads
//
// A relayout event carries either `xaxis.autorange` (view reset) or the
// explicit axis bounds. The y axis of the pledged chart is logarithmic, so its
// bounds arrive as exponents.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

const X0: &str = "xaxis.range[0]";
const X1: &str = "xaxis.range[1]";
const Y0: &str = "yaxis.range[0]";
const Y1: &str = "yaxis.range[1]";
const AUTORANGE: &str = "xaxis.autorange";

/// Visible window of a date/log-value chart
#[derive(Clone, Debug, PartialEq)]
pub struct ViewRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub min: f64,
    pub max: f64,
}

impl ViewRange {
    /// Window described by a relayout payload; `None` means the whole dataset
    pub fn from_layout(layout: &Value) -> Option<Self> {
        let fields = layout.as_object()?;
        if fields.contains_key(AUTORANGE) {
            return None;
        }
        Some(Self {
            start: date_field(fields, X0)?,
            end: date_field(fields, X1)?,
            min: 10f64.powf(number_field(fields, Y0)?),
            max: 10f64.powf(number_field(fields, Y1)?),
        })
    }

    /// Inclusive on both axes; a missing value is never inside the window
    pub fn contains(&self, at: NaiveDateTime, value: Option<f64>) -> bool {
        let Some(value) = value else {
            return false;
        };
        at >= self.start && at <= self.end && value >= self.min && value <= self.max
    }
}

fn date_field(fields: &Map<String, Value>, key: &str) -> Option<NaiveDateTime> {
    fields.get(key)?.as_str().and_then(parse_timestamp)
}

fn number_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the timestamp formats produced by Plotly and common CSV exports
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
}
