use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils;

/// Defaults for the map page. Served as `settings.json`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapSettings {
    pub mapbox_token: Option<String>,
    pub style: String,
    pub marker_color: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: f64,
    pub default_date: String,
    pub min_date: String,
    pub max_date: String,
    pub default_line: String,
    pub default_order: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        // Rio de Janeiro; the dataset covers 2019-01-25 to 2019-02-25
        MapSettings {
            mapbox_token: None,
            style: "mapbox://styles/mapbox/dark-v10".to_string(),
            marker_color: "fuchsia".to_string(),
            center_latitude: -22.907171,
            center_longitude: -43.341513,
            zoom: 11.,
            default_date: "2019-01-30".to_string(),
            min_date: "2019-01-25".to_string(),
            max_date: "2019-02-25".to_string(),
            default_line: "485.0".to_string(),
            default_order: "B31019".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub druid_url: String,
    pub druid_endpoint: String,
    pub datasource: String,
    pub host: String,
    pub port: u16,
    pub log_dir: Option<String>,
    pub map: MapSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            druid_url: "http://localhost:8082".to_string(),
            druid_endpoint: "druid/v2".to_string(),
            datasource: "bus_data".to_string(),
            host: "localhost".to_string(),
            port: 8050,
            log_dir: None,
            map: MapSettings::default(),
        }
    }
}

const ENV_PREFIX: &str = "BUSMAP_";

impl Config {
    /// Defaults overridden by `BUSMAP_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();
        let set = |target: &mut String, name: &str| {
            if let Some(value) = var(name) {
                *target = value;
            }
        };
        set(&mut config.druid_url, "DRUID_URL");
        set(&mut config.druid_endpoint, "DRUID_ENDPOINT");
        set(&mut config.datasource, "DATASOURCE");
        set(&mut config.host, "HOST");
        set(&mut config.map.default_date, "DEFAULT_DATE");
        set(&mut config.map.default_line, "DEFAULT_LINE");
        set(&mut config.map.default_order, "DEFAULT_ORDER");
        if let Some(port) = var("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_PREFIX}PORT `{port}`"))?;
        }
        config.log_dir = var("LOG_DIR").or(config.log_dir);
        config.map.mapbox_token = var("MAPBOX_TOKEN").or(config.map.mapbox_token);
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for date in [
            &self.map.default_date,
            &self.map.min_date,
            &self.map.max_date,
        ] {
            utils::parse_date(date)?;
        }
        if self.datasource.trim().is_empty() {
            bail!("datasource must not be empty");
        }
        Ok(())
    }
}
