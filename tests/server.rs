pub mod test_utils;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use busmap_core::config::MapSettings;
use busmap_core::server::{self, AppState};
use serde_json::{json, Value};
use test_utils::FakeEngine;

fn app_state(engine: FakeEngine) -> web::Data<AppState<FakeEngine>> {
    web::Data::new(AppState {
        dashboard: Arc::new(test_utils::dashboard(engine)),
        map: MapSettings::default(),
    })
}

fn sample_engine() -> FakeEngine {
    FakeEngine {
        group_by_rows: test_utils::sample_group_by_rows(),
        scan_rows: test_utils::sample_scan_rows(),
        ..Default::default()
    }
}

#[actix_web::test]
async fn lines_and_orders() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(sample_engine()))
            .configure(server::routes::<FakeEngine>),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/lines?date=2019-01-30")
        .to_request();
    let lines: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        lines,
        json!([
            {"label": "485", "value": "485.0"},
            {"label": "486", "value": "486.0"}
        ])
    );

    let req = test::TestRequest::get()
        .uri("/api/orders?date=2019-01-30&line=485.0")
        .to_request();
    let orders: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        orders,
        json!([
            {"label": "B31019", "value": "B31019"},
            {"label": "B31020", "value": "B31020"}
        ])
    );

    let req = test::TestRequest::get().uri("/api/lines").to_request();
    let lines: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(lines, json!([]));
}

#[actix_web::test]
async fn positions_as_geojson() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(sample_engine()))
            .configure(server::routes::<FakeEngine>),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/positions?line=485.0&order=B31019&date=2019-01-30")
        .to_request();
    let geojson: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(geojson["type"], "FeatureCollection");
    assert_eq!(geojson["features"].as_array().unwrap().len(), 3);
    assert_eq!(geojson["features"][1]["properties"]["speed"], "36 Km/h");
}

#[actix_web::test]
async fn bad_input_is_a_client_error() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(sample_engine()))
            .configure(server::routes::<FakeEngine>),
    )
    .await;

    for uri in [
        "/api/positions?line=485.0&date=2019-01-30",
        "/api/positions?line=485.0&order=B31019&date=yesterday",
        "/api/lines?date=30-01-2019",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn engine_failure_is_a_bad_gateway() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(FakeEngine::failing("druid is down")))
            .configure(server::routes::<FakeEngine>),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/lines?date=2019-01-30")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("druid is down"));
}

#[actix_web::test]
async fn request_envelope() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(sample_engine()))
            .configure(server::routes::<FakeEngine>),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/request")
        .set_json(json!({
            "requestId": "test-123",
            "query": "bus_orders",
            "payload": {"date": "2019-01-30", "line": "486.0"}
        }))
        .to_request();
    let response: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        response,
        json!({
            "requestId": "test-123",
            "success": true,
            "data": [{"label": "B31021", "value": "B31021"}],
            "error": null
        })
    );
}

#[actix_web::test]
async fn page_and_settings() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(FakeEngine::default()))
            .configure(server::routes::<FakeEngine>),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("date-picker"));

    let req = test::TestRequest::get().uri("/settings.json").to_request();
    let settings: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(settings["default_date"], "2019-01-30");
    assert_eq!(settings["default_line"], "485.0");
    assert_eq!(settings["default_order"], "B31019");
    assert_eq!(settings["zoom"], 11.0);
}
