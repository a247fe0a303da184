use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dashboard::Dashboard;
use crate::druid::QueryEngine;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BusLinesQuery {
    pub date: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BusOrdersQuery {
    pub date: Option<String>,
    pub line: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BusPositionsQuery {
    pub line: Option<String>,
    pub order: Option<String>,
    pub date: Option<String>,
}

// Unified request interface
#[derive(Deserialize, Serialize, Debug)]
#[serde(tag = "query", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum RequestPayload {
    BusLines(BusLinesQuery),
    BusOrders(BusOrdersQuery),
    BusPositions(BusPositionsQuery),
}

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default = "new_request_id")]
    pub request_id: String,
    #[serde(flatten)]
    pub payload: RequestPayload,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse<T> {
    pub request_id: String,
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> RequestResponse<T> {
    fn ok(request_id: &str, data: T) -> Self {
        RequestResponse {
            request_id: request_id.to_string(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(request_id: &str, error: String) -> Self {
        RequestResponse {
            request_id: request_id.to_string(),
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

fn to_value<T: Serialize>(result: Result<T>) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(result?)?)
}

impl Request {
    /// Parse a JSON string into a Request
    pub fn parse(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Runs the query against the dashboard. Failures are reported in the
    /// response, never as a Rust error.
    pub async fn handle<E: QueryEngine>(
        &self,
        dashboard: &Dashboard<E>,
    ) -> RequestResponse<serde_json::Value> {
        let result = match &self.payload {
            RequestPayload::BusLines(query) => {
                to_value(dashboard.line_options(query.date.as_deref()).await)
            }
            RequestPayload::BusOrders(query) => to_value(
                dashboard
                    .order_options(query.date.as_deref(), query.line.as_deref())
                    .await,
            ),
            RequestPayload::BusPositions(query) => to_value(
                dashboard
                    .positions(
                        query.line.as_deref(),
                        query.order.as_deref(),
                        query.date.as_deref(),
                    )
                    .await,
            ),
        };
        match result {
            Ok(value) => RequestResponse::ok(&self.request_id, value),
            Err(e) => {
                error!("request {} failed: {e:#}", self.request_id);
                RequestResponse::err(&self.request_id, format!("{e}"))
            }
        }
    }
}
