use anyhow::Result;

use crate::bus_position::{self, PositionSample, SCAN_COLUMNS};
use crate::druid::{Filter, GroupByQuery, Interval, QueryEngine, ScanQuery};
use crate::line_catalog::{self, LineCatalog, LINE_DIMENSION, ORDER_DIMENSION};
use crate::utils;

/// Read-only access to the bus GPS datasource.
///
/// Both operations issue exactly one query, reshape the result and keep no
/// state between calls.
pub struct BusData<E> {
    engine: E,
    datasource: String,
}

impl<E: QueryEngine> BusData<E> {
    pub fn new(engine: E, datasource: &str) -> Self {
        BusData {
            engine,
            datasource: datasource.to_string(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Every line seen on `date`, with the orders that ran on it. An absent or
    /// empty date yields an empty catalog without touching the engine.
    pub async fn list_bus_lines(&self, date: Option<&str>) -> Result<LineCatalog> {
        let Some(date) = utils::non_empty(date) else {
            return Ok(LineCatalog::new());
        };
        let interval = Interval::one_day(utils::parse_date(date)?);
        info!("listing bus lines for {interval}");

        let query = GroupByQuery::new(
            &self.datasource,
            interval,
            &[LINE_DIMENSION, ORDER_DIMENSION],
        );
        let rows = self.engine.group_by(&query).await?;
        let catalog = line_catalog::build_line_catalog(&rows);
        info!(
            "{} groupBy rows -> {} bus lines for {date}",
            rows.len(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// The GPS trace of one vehicle during `date`.
    pub async fn get_bus_positions(
        &self,
        line: Option<&str>,
        order: Option<&str>,
        date: Option<&str>,
    ) -> Result<Vec<PositionSample>> {
        let (Some(line), Some(order), Some(date)) = (
            utils::non_empty(line),
            utils::non_empty(order),
            utils::non_empty(date),
        ) else {
            bail!("bus line, order and date are all required");
        };
        let interval = Interval::one_day(utils::parse_date(date)?);
        info!("fetching positions of {order} on line {line} for {interval}");

        let query = ScanQuery::new(&self.datasource, interval, &SCAN_COLUMNS).with_filter(
            Filter::selector(LINE_DIMENSION, line).and(Filter::selector(ORDER_DIMENSION, order)),
        );
        let rows = self.engine.scan(&query).await?;
        let samples = bus_position::shape_positions(&rows);
        info!("{} scan rows -> {} positions", rows.len(), samples.len());
        Ok(samples)
    }
}
