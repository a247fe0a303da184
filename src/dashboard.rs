use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::bus_data::BusData;
use crate::bus_position::{self, PositionSample};
use crate::catalog_cache::CatalogCache;
use crate::druid::QueryEngine;
use crate::line_catalog::{LineCatalog, SelectOption};
use crate::utils;

/// The trace of one vehicle on one day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BusTrack {
    pub line: String,
    pub order: String,
    pub date: String,
    pub positions: Vec<PositionSample>,
}

impl BusTrack {
    pub fn to_geojson(&self) -> Value {
        bus_position::to_geojson(&self.positions)
    }
}

/// What the page's controls are wired to:
///   date -> line options -> (line) order options -> (order) positions
///
/// The catalog of the last selected date is cached so that switching lines
/// does not query the engine again.
pub struct Dashboard<E> {
    bus_data: BusData<E>,
    catalog_cache: CatalogCache,
}

impl<E: QueryEngine> Dashboard<E> {
    pub fn new(bus_data: BusData<E>) -> Self {
        Dashboard {
            bus_data,
            catalog_cache: CatalogCache::new(),
        }
    }

    pub fn bus_data(&self) -> &BusData<E> {
        &self.bus_data
    }

    pub fn catalog_cache(&self) -> &CatalogCache {
        &self.catalog_cache
    }

    pub async fn catalog(&self, date: Option<&str>) -> Result<Arc<LineCatalog>> {
        let Some(date) = utils::non_empty(date) else {
            return Ok(Arc::new(LineCatalog::new()));
        };
        let day = utils::parse_date(date)?;
        self.catalog_cache
            .get_or_compute(day, || self.bus_data.list_bus_lines(Some(date)))
            .await
    }

    pub async fn line_options(&self, date: Option<&str>) -> Result<Vec<SelectOption>> {
        Ok(self.catalog(date).await?.line_options())
    }

    pub async fn order_options(
        &self,
        date: Option<&str>,
        line: Option<&str>,
    ) -> Result<Vec<SelectOption>> {
        match (utils::non_empty(date), utils::non_empty(line)) {
            (Some(date), Some(line)) => Ok(self.catalog(Some(date)).await?.order_options(line)),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn positions(
        &self,
        line: Option<&str>,
        order: Option<&str>,
        date: Option<&str>,
    ) -> Result<BusTrack> {
        let positions = self.bus_data.get_bus_positions(line, order, date).await?;
        Ok(BusTrack {
            line: line.unwrap_or_default().trim().to_string(),
            order: order.unwrap_or_default().trim().to_string(),
            date: date.unwrap_or_default().trim().to_string(),
            positions,
        })
    }
}
