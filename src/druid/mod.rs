pub mod client;
pub use client::{DruidClient, QueryEngine};

pub mod query;
pub use query::{Filter, GroupByQuery, GroupByRow, Interval, ScanQuery, ScanRow};
