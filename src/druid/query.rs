use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A date range in Druid's ISO 8601 `<start>/<period>` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDate,
    pub days: u32,
}

impl Interval {
    /// The 24 hours starting at midnight of `date`.
    pub fn one_day(date: NaiveDate) -> Self {
        Interval {
            start: date,
            days: 1,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/P{}D", self.start.format("%Y-%m-%d"), self.days)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    All,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Filter {
    Selector { dimension: String, value: String },
    And { fields: Vec<Filter> },
}

impl Filter {
    pub fn selector(dimension: &str, value: &str) -> Self {
        Filter::Selector {
            dimension: dimension.to_string(),
            value: value.to_string(),
        }
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And { mut fields } => {
                fields.push(other);
                Filter::And { fields }
            }
            selector => Filter::And {
                fields: vec![selector, other],
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByQuery {
    query_type: &'static str,
    pub data_source: String,
    pub granularity: Granularity,
    pub intervals: Vec<Interval>,
    pub dimensions: Vec<String>,
}

impl GroupByQuery {
    pub fn new(data_source: &str, interval: Interval, dimensions: &[&str]) -> Self {
        GroupByQuery {
            query_type: "groupBy",
            data_source: data_source.to_string(),
            granularity: Granularity::All,
            intervals: vec![interval],
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuery {
    query_type: &'static str,
    pub data_source: String,
    pub granularity: Granularity,
    pub intervals: Vec<Interval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    pub columns: Vec<String>,
    pub result_format: &'static str,
}

impl ScanQuery {
    pub fn new(data_source: &str, interval: Interval, columns: &[&str]) -> Self {
        ScanQuery {
            query_type: "scan",
            data_source: data_source.to_string(),
            granularity: Granularity::All,
            intervals: vec![interval],
            filter: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            result_format: "list",
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// One row of a groupBy result. The dimension values live in `event`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupByRow {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub event: Map<String, Value>,
}

impl GroupByRow {
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.event.get(name).and_then(Value::as_str)
    }
}

/// A scan result arrives in batches, one per segment.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanBatch {
    #[serde(default)]
    pub segment_id: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    pub events: Vec<ScanRow>,
}

pub type ScanRow = Map<String, Value>;
