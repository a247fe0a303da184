use std::future::Future;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::NaiveDate;

use crate::line_catalog::LineCatalog;

// Only the catalog of the last selected date is worth keeping: picking a new
// date replaces the dropdown contents wholesale, so older catalogs are never
// read again.
#[derive(Default)]
pub struct CatalogCache {
    latest: Mutex<Option<(NaiveDate, Arc<LineCatalog>)>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        CatalogCache {
            latest: Mutex::new(None),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<Arc<LineCatalog>> {
        let latest = self.latest.lock().unwrap();
        match latest.as_ref() {
            Some((cached_date, catalog)) if *cached_date == date => Some(catalog.clone()),
            _ => None,
        }
    }

    pub fn set(&self, date: NaiveDate, catalog: Arc<LineCatalog>) {
        let mut latest = self.latest.lock().unwrap();
        *latest = Some((date, catalog));
    }

    // The lock is released while `f` runs, two concurrent misses for the same
    // date may both compute. The last one wins, which is harmless.
    pub async fn get_or_compute<F, Fut>(&self, date: NaiveDate, f: F) -> Result<Arc<LineCatalog>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LineCatalog>>,
    {
        if let Some(catalog) = self.get(date) {
            debug!("line catalog cache hit for {date}");
            return Ok(catalog);
        }
        let catalog = Arc::new(f().await?);
        self.set(date, catalog.clone());
        Ok(catalog)
    }

    pub fn clear(&self) {
        let mut latest = self.latest.lock().unwrap();
        *latest = None;
    }
}
