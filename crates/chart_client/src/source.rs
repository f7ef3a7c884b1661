//! Where chart series come from.

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{
    GraphData, GraphDataResponse, RefreshResponse, GRAPH_DATA_PATH, REFRESH_DATA_PATH,
};
use tracing::{debug, info};
use url::Url;

use crate::{error::ChartError, query::GraphDataQuery};

#[async_trait]
pub trait GraphDataSource: Send + Sync {
    async fn graph_data(&self, query: &GraphDataQuery) -> Result<GraphData, ChartError>;
    async fn refresh_data(&self) -> Result<RefreshResponse, ChartError>;
}

/// HTTP client for the dashboard backend.
#[derive(Clone)]
pub struct HttpDataService {
    http: Client,
    base: Url,
}

impl HttpDataService {
    pub fn new(server_url: &str) -> Result<Self, ChartError> {
        Ok(Self {
            http: Client::new(),
            base: Url::parse(server_url)?,
        })
    }
}

#[async_trait]
impl GraphDataSource for HttpDataService {
    async fn graph_data(&self, query: &GraphDataQuery) -> Result<GraphData, ChartError> {
        let url = self.base.join(GRAPH_DATA_PATH)?;
        debug!(%url, players = query.players.len(), stat = ?query.stat, "requesting graph data");
        let response: GraphDataResponse = self
            .http
            .get(url)
            .query(&query.to_pairs())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let labels = response.labels.ok_or(ChartError::MissingLabels)?;
        Ok(GraphData {
            labels,
            datasets: response.datasets,
        })
    }

    async fn refresh_data(&self) -> Result<RefreshResponse, ChartError> {
        let url = self.base.join(REFRESH_DATA_PATH)?;
        let response: RefreshResponse = self
            .http
            .post(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(
            message = response.message.as_deref().unwrap_or_default(),
            log_lines = response.log.as_ref().map_or(0, Vec::len),
            "data refresh finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
