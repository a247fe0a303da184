use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::druid::ScanRow;
use crate::utils;

pub const TIME_COLUMN: &str = "__time";
pub const TIME_DELTA_COLUMN: &str = "datetimeDiff";
pub const DISTANCE_COLUMN: &str = "distance";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

pub const SCAN_COLUMNS: [&str; 5] = [
    TIME_COLUMN,
    TIME_DELTA_COLUMN,
    DISTANCE_COLUMN,
    LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
];

/// Pings further apart than this are a hole in the GPS feed, not a movement.
pub const MAX_TIME_DELTA_IN_SECONDS: f64 = 5. * 60.;

const MPS_TO_KMH: f64 = 3.6;

/// Average speed since the previous ping, rendered as `36 Km/h`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Speed {
    pub kmh: i64,
}

impl Speed {
    /// `None` when the speed cannot be derived: a missing value, or a
    /// non-positive time delta.
    pub fn from_distance_and_time_delta(
        distance_m: Option<f64>,
        time_delta_s: Option<f64>,
    ) -> Option<Speed> {
        let (distance_m, time_delta_s) = (distance_m?, time_delta_s?);
        if time_delta_s <= 0. {
            return None;
        }
        // ties go to the even integer, the same as the dataframe rounding the
        // dashboard was first built on
        let kmh = (distance_m / time_delta_s * MPS_TO_KMH).round_ties_even();
        if kmh.is_finite() {
            Some(Speed { kmh: kmh as i64 })
        } else {
            None
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Km/h", self.kmh)
    }
}

impl Serialize for Speed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(serialize_with = "serialize_datetime")]
    pub datetime: DateTime<Utc>,
    pub speed: Option<Speed>,
}

fn serialize_datetime<S: Serializer>(
    datetime: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&utils::format_datetime(datetime))
}

/// Reads a numeric column. Druid may hand back numbers as strings for string
/// typed columns, those are parsed too.
fn numeric(row: &ScanRow, column: &str) -> Option<f64> {
    let value = match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn timestamp(row: &ScanRow) -> Option<DateTime<Utc>> {
    let epoch_ms = match row.get(TIME_COLUMN)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    utils::datetime_of_epoch_ms(epoch_ms)
}

/// Turns raw scan rows into map points.
///
/// Only rows whose time delta is a number no greater than
/// [`MAX_TIME_DELTA_IN_SECONDS`] are kept. Rows without a time or a coordinate
/// cannot be drawn and are dropped too. `speed` is left empty when it cannot
/// be derived.
pub fn shape_positions(rows: &[ScanRow]) -> Vec<PositionSample> {
    let mut samples = Vec::with_capacity(rows.len());
    let mut gaps = 0;
    for row in rows {
        let time_delta = numeric(row, TIME_DELTA_COLUMN);
        if !time_delta.is_some_and(|delta| delta <= MAX_TIME_DELTA_IN_SECONDS) {
            gaps += 1;
            continue;
        }

        let (Some(datetime), Some(latitude), Some(longitude)) = (
            timestamp(row),
            numeric(row, LATITUDE_COLUMN),
            numeric(row, LONGITUDE_COLUMN),
        ) else {
            warn!("skipping scan row without time or coordinates: {row:?}");
            continue;
        };

        samples.push(PositionSample {
            latitude,
            longitude,
            datetime,
            speed: Speed::from_distance_and_time_delta(numeric(row, DISTANCE_COLUMN), time_delta),
        });
    }
    if gaps > 0 {
        debug!("dropped {gaps} rows after a gps gap or without a time delta");
    }
    samples
}

/// A GeoJSON `FeatureCollection` of points, ready for a map source.
pub fn to_geojson(samples: &[PositionSample]) -> Value {
    let features: Vec<Value> = samples
        .iter()
        .map(|sample| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [sample.longitude, sample.latitude],
                },
                "properties": {
                    "datetime": utils::format_datetime(&sample.datetime),
                    "speed": sample.speed,
                },
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
