#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use busmap_core::bus_data::BusData;
use busmap_core::dashboard::Dashboard;
use busmap_core::druid::{GroupByQuery, GroupByRow, QueryEngine, ScanQuery, ScanRow};
use serde_json::{json, Value};

/// An in-memory query engine that answers every query with fixed rows and
/// remembers what it was asked.
#[derive(Default)]
pub struct FakeEngine {
    pub group_by_rows: Vec<GroupByRow>,
    pub scan_rows: Vec<ScanRow>,
    pub fail_with: Option<String>,
    pub group_by_queries: Mutex<Vec<GroupByQuery>>,
    pub scan_queries: Mutex<Vec<ScanQuery>>,
}

impl FakeEngine {
    pub fn with_group_by_rows(rows: Vec<GroupByRow>) -> Self {
        FakeEngine {
            group_by_rows: rows,
            ..Default::default()
        }
    }

    pub fn with_scan_rows(rows: Vec<ScanRow>) -> Self {
        FakeEngine {
            scan_rows: rows,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        FakeEngine {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn group_by_count(&self) -> usize {
        self.group_by_queries.lock().unwrap().len()
    }

    pub fn scan_count(&self) -> usize {
        self.scan_queries.lock().unwrap().len()
    }
}

impl QueryEngine for FakeEngine {
    async fn group_by(&self, query: &GroupByQuery) -> Result<Vec<GroupByRow>> {
        self.group_by_queries.lock().unwrap().push(query.clone());
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{message}");
        }
        Ok(self.group_by_rows.clone())
    }

    async fn scan(&self, query: &ScanQuery) -> Result<Vec<ScanRow>> {
        self.scan_queries.lock().unwrap().push(query.clone());
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{message}");
        }
        Ok(self.scan_rows.clone())
    }
}

pub fn group_by_row(line: &str, order: &str) -> GroupByRow {
    serde_json::from_value(json!({
        "version": "v1",
        "timestamp": "2019-01-30T00:00:00.000Z",
        "event": {"line": line, "order": order}
    }))
    .unwrap()
}

/// The two-line catalog used across the tests:
/// `{"485.0": ["B31019", "B31020"], "486.0": ["B31021"]}`
pub fn sample_group_by_rows() -> Vec<GroupByRow> {
    vec![
        group_by_row("485.0", "B31019"),
        group_by_row("485.0", "B31020"),
        group_by_row("486.0", "B31021"),
    ]
}

pub fn scan_row(time_ms: i64, time_delta: Value, distance: Value, lat: f64, lon: f64) -> ScanRow {
    match json!({
        "__time": time_ms,
        "datetimeDiff": time_delta,
        "distance": distance,
        "latitude": lat,
        "longitude": lon,
    }) {
        Value::Object(row) => row,
        _ => unreachable!(),
    }
}

// 2019-01-30 00:00:00 UTC
pub const DAY_START_MS: i64 = 1548806400000;

pub fn sample_scan_rows() -> Vec<ScanRow> {
    vec![
        scan_row(DAY_START_MS, json!(0), json!(0), -22.90, -43.30),
        scan_row(DAY_START_MS + 10_000, json!(10), json!(100), -22.901, -43.301),
        scan_row(DAY_START_MS + 410_000, json!(400), json!(5000), -22.95, -43.35),
        scan_row(DAY_START_MS + 470_000, json!(60), json!(250), -22.951, -43.352),
    ]
}

pub fn bus_data(engine: FakeEngine) -> BusData<FakeEngine> {
    BusData::new(engine, "bus_data")
}

pub fn dashboard(engine: FakeEngine) -> Dashboard<FakeEngine> {
    Dashboard::new(BusData::new(engine, "bus_data"))
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
