use std::env;
use std::sync::Arc;

use anyhow::Result;
use busmap_core::bus_data::BusData;
use busmap_core::config::Config;
use busmap_core::dashboard::Dashboard;
use busmap_core::druid::DruidClient;
use busmap_core::logs;
use busmap_core::server::DashboardServer;

pub fn main() -> Result<()> {
    // An optional json config file, otherwise defaults + BUSMAP_* env vars
    let config = match env::args().nth(1) {
        Some(path) => Config::from_json_file(path)?,
        None => Config::from_env()?,
    };
    logs::init(config.log_dir.as_deref())?;

    let client = DruidClient::new(&config.druid_url, &config.druid_endpoint)?;
    log::info!(
        "querying datasource `{}` at {}",
        config.datasource,
        client.query_url()
    );
    let dashboard = Arc::new(Dashboard::new(BusData::new(client, &config.datasource)));

    let server =
        DashboardServer::create_and_start(&config.host, config.port, dashboard, config.map)?;
    println!("view map at: {}", server.http_url());

    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C! Shutting down...");
        std::process::exit(0);
    })?;

    // Block the main thread to keep server running
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}
