#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod bus_data;
pub mod bus_position;
pub mod catalog_cache;
pub mod config;
pub mod dashboard;
pub mod druid;
pub mod line_catalog;
pub mod logs;
pub mod request;
pub mod server;
pub mod utils;
