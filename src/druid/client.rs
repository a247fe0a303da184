use std::future::Future;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::query::{GroupByQuery, GroupByRow, ScanBatch, ScanQuery, ScanRow};

/// Anything that can answer the two read-only query shapes the dashboard
/// needs. `DruidClient` talks to a real broker; tests use an in-memory one.
pub trait QueryEngine {
    fn group_by(
        &self,
        query: &GroupByQuery,
    ) -> impl Future<Output = Result<Vec<GroupByRow>>> + Send;

    /// Returns the events of every batch, concatenated in arrival order.
    fn scan(&self, query: &ScanQuery) -> impl Future<Output = Result<Vec<ScanRow>>> + Send;
}

/// Druid's error body for failed queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DruidError {
    error: Option<String>,
    error_message: Option<String>,
}

#[derive(Clone)]
pub struct DruidClient {
    client: reqwest::Client,
    query_url: String,
}

impl DruidClient {
    /// `broker_url` like `http://localhost:8082`, `endpoint` like `druid/v2`.
    pub fn new(broker_url: &str, endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("busmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(DruidClient {
            client,
            query_url: format!(
                "{}/{}",
                broker_url.trim_end_matches('/'),
                endpoint.trim_matches('/')
            ),
        })
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    async fn post<Q, R>(&self, query: &Q) -> Result<R>
    where
        Q: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.query_url)
            .json(query)
            .send()
            .await
            .with_context(|| format!("failed to reach druid broker at {}", self.query_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<DruidError>(&body) {
                Ok(DruidError {
                    error,
                    error_message,
                }) => [error, error_message].into_iter().flatten().join(": "),
                Err(_) => body,
            };
            bail!("druid query failed with {status}: {message}");
        }

        response
            .json()
            .await
            .context("failed to decode druid response")
    }
}

impl QueryEngine for DruidClient {
    async fn group_by(&self, query: &GroupByQuery) -> Result<Vec<GroupByRow>> {
        debug!("groupBy query: {}", serde_json::to_string(query)?);
        self.post(query).await
    }

    async fn scan(&self, query: &ScanQuery) -> Result<Vec<ScanRow>> {
        debug!("scan query: {}", serde_json::to_string(query)?);
        let batches: Vec<ScanBatch> = self.post(query).await?;
        Ok(batches.into_iter().flat_map(|batch| batch.events).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::DruidClient;

    #[test]
    fn query_url_joins_broker_and_endpoint() {
        let client = DruidClient::new("http://10.0.0.1:8082/", "/druid/v2/").unwrap();
        assert_eq!(client.query_url(), "http://10.0.0.1:8082/druid/v2");
        let client = DruidClient::new("http://localhost:8082", "druid/v2").unwrap();
        assert_eq!(client.query_url(), "http://localhost:8082/druid/v2");
    }
}
