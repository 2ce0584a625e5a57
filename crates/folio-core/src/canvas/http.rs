//! Canvas sink that talks to a running Folio server.

use super::sink::{position_updates, CanvasSink};
use crate::content::Position;
use crate::error::{FolioError, FolioResult};
use crate::graph::{BatchOutcome, Edge, GraphView};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// Remote sink over the content API.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    base_url: String,
    password: Option<String>,
}

#[derive(Deserialize)]
struct EdgeResponse {
    edge: Edge,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpSink {
    pub fn new(base_url: &str, password: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            password,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Load the graph the canvas starts from.
    pub async fn fetch_view(&self) -> FolioResult<GraphView> {
        let response = self.client.get(self.url("/api/content")).send().await.map_err(remote)?;
        checked(response).await?.json().await.map_err(remote)
    }
}

fn remote(e: reqwest::Error) -> FolioError {
    FolioError::Remote(e.to_string())
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn checked(response: Response) -> FolioResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
    Err(FolioError::Remote(format!("{} {}: {}", status.as_u16(), url, message)))
}

#[async_trait]
impl CanvasSink for HttpSink {
    async fn save_positions(&self, positions: HashMap<String, Position>) -> FolioResult<BatchOutcome> {
        let body = json!({ "updates": position_updates(positions) });
        let response = self
            .client
            .put(self.url("/api/content/batch/positions"))
            .json(&body)
            .send()
            .await
            .map_err(remote)?;
        checked(response).await?.json().await.map_err(remote)
    }

    async fn add_edge(&self, source: &str, target: &str) -> FolioResult<Edge> {
        let body = json!({ "source": source, "target": target, "Password": self.password });
        let response = self
            .client
            .post(self.url("/api/content"))
            .json(&body)
            .send()
            .await
            .map_err(remote)?;
        let created: EdgeResponse = checked(response).await?.json().await.map_err(remote)?;
        Ok(created.edge)
    }

    async fn remove_edge(&self, edge_id: &str) -> FolioResult<()> {
        let body = json!({ "id": edge_id, "type": "edge", "Password": self.password });
        let response = self
            .client
            .delete(self.url("/api/content"))
            .json(&body)
            .send()
            .await
            .map_err(remote)?;
        checked(response).await?;
        Ok(())
    }
}
