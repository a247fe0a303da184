use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use actix_web::dev::{Server, ServerHandle, Service};
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use tokio::runtime::Runtime;

use crate::config::MapSettings;
use crate::dashboard::Dashboard;
use crate::druid::QueryEngine;
use crate::request::Request;
use crate::utils;

// App state shared by every worker
pub struct AppState<E> {
    pub dashboard: Arc<Dashboard<E>>,
    pub map: MapSettings,
}

#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
    pub date: Option<String>,
    pub line: Option<String>,
    pub order: Option<String>,
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message }))
}

// Upstream failures are reported as a gateway problem, the page just shows an
// empty element.
fn bad_gateway(error: anyhow::Error) -> HttpResponse {
    error!("query failed: {error:#}");
    HttpResponse::BadGateway().json(json!({ "error": format!("{error}") }))
}

fn check_date(date: Option<&str>) -> Option<HttpResponse> {
    let date = utils::non_empty(date)?;
    utils::parse_date(date)
        .err()
        .map(|e| bad_request(&e.to_string()))
}

async fn serve_lines<E: QueryEngine>(
    params: web::Query<PageParams>,
    data: web::Data<AppState<E>>,
) -> HttpResponse {
    if let Some(response) = check_date(params.date.as_deref()) {
        return response;
    }
    match data.dashboard.line_options(params.date.as_deref()).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => bad_gateway(e),
    }
}

async fn serve_orders<E: QueryEngine>(
    params: web::Query<PageParams>,
    data: web::Data<AppState<E>>,
) -> HttpResponse {
    if let Some(response) = check_date(params.date.as_deref()) {
        return response;
    }
    match data
        .dashboard
        .order_options(params.date.as_deref(), params.line.as_deref())
        .await
    {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => bad_gateway(e),
    }
}

async fn serve_positions<E: QueryEngine>(
    params: web::Query<PageParams>,
    data: web::Data<AppState<E>>,
) -> HttpResponse {
    let (line, order, date) = (
        params.line.as_deref(),
        params.order.as_deref(),
        params.date.as_deref(),
    );
    if [line, order, date]
        .into_iter()
        .any(|v| utils::non_empty(v).is_none())
    {
        return bad_request("line, order and date are required");
    }
    if let Some(response) = check_date(date) {
        return response;
    }
    match data.dashboard.positions(line, order, date).await {
        Ok(track) => HttpResponse::Ok().json(track.to_geojson()),
        Err(e) => bad_gateway(e),
    }
}

async fn serve_request<E: QueryEngine>(
    request: web::Json<Request>,
    data: web::Data<AppState<E>>,
) -> HttpResponse {
    let response = request.handle(&data.dashboard).await;
    HttpResponse::Ok().json(response)
}

async fn serve_settings<E: QueryEngine>(data: web::Data<AppState<E>>) -> HttpResponse {
    HttpResponse::Ok().json(&data.map)
}

const INDEX_HTML: &str = include_str!("../static/index.html");

async fn index() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body(INDEX_HTML)
}

/// Registers the page and its JSON endpoints. `AppState<E>` must be provided
/// as app data.
pub fn routes<E: QueryEngine + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/settings.json", web::get().to(serve_settings::<E>))
        .route("/api/lines", web::get().to(serve_lines::<E>))
        .route("/api/orders", web::get().to(serve_orders::<E>))
        .route("/api/positions", web::get().to(serve_positions::<E>))
        .route("/api/request", web::post().to(serve_request::<E>));
}

/// The dashboard's http server, running on its own thread and runtime.
pub struct DashboardServer {
    addr: SocketAddr,
    server_handle: Option<ServerHandle>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DashboardServer {
    /// Binds `host:port` (port 0 picks a free one) and starts serving. Returns
    /// once the socket is bound.
    pub fn create_and_start<E>(
        host: &str,
        port: u16,
        dashboard: Arc<Dashboard<E>>,
        map: MapSettings,
    ) -> Result<Self>
    where
        E: QueryEngine + Send + Sync + 'static,
    {
        let host = host.to_string();
        let app_state = web::Data::new(AppState { dashboard, map });

        // Create a channel to signal when the server is bound
        let (tx, rx) = std::sync::mpsc::channel::<Result<(SocketAddr, ServerHandle)>>();

        let handle = thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = tx.send(Err(anyhow!("failed to create tokio runtime: {e}")));
                    return;
                }
            };
            runtime.block_on(async move {
                info!("Setting up server routes...");
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(app_state.clone())
                        .wrap_fn(|req, srv| {
                            info!("Incoming request: {} {}", req.method(), req.uri());
                            srv.call(req)
                        })
                        .configure(routes::<E>)
                })
                .bind((host.as_str(), port));

                let server = match server {
                    Ok(server) => server,
                    Err(e) => {
                        let _ = tx.send(Err(anyhow!("failed to bind {host}:{port}: {e}")));
                        return;
                    }
                };
                let Some(addr) = server.addrs().first().copied() else {
                    let _ = tx.send(Err(anyhow!("no address bound for {host}:{port}")));
                    return;
                };

                let server: Server = server.run();
                let _ = tx.send(Ok((addr, server.handle())));
                info!("Server bound successfully to {addr}");
                if let Err(e) = server.await {
                    error!("server stopped with error: {e}");
                }
            });
        });

        let (addr, server_handle) = rx
            .recv()
            .map_err(|_| anyhow!("server thread exited before binding"))??;

        Ok(DashboardServer {
            addr,
            server_handle: Some(server_handle),
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stops accepting connections, lets in-flight requests finish and joins
    /// the server thread. Safe to call from inside another runtime.
    pub fn stop(&mut self) {
        if let Some(server_handle) = self.server_handle.take() {
            pollster::block_on(server_handle.stop(true));
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("server thread panicked");
            }
        }
    }
}

impl Drop for DashboardServer {
    fn drop(&mut self) {
        self.stop();
    }
}
