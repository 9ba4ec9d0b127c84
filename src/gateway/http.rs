//! HTTP gateway - executes CRUD calls with reqwest

use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Response, Url};

use crate::config::Config;
use crate::error::{ErrorBody, GatewayError};
use crate::gateway::BlogGateway;
use crate::models::{BlogPayload, BlogRecord};

/// Gateway backed by a REST collection (`GET/POST /blogs`, `PUT/DELETE /blogs/{id}`)
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    collection: Url,
}

impl HttpGateway {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let raw = config.collection_url();
        let collection = Url::parse(&raw).with_context(|| format!("invalid backend URL {}", raw))?;
        if collection.cannot_be_a_base() {
            bail!("backend URL {} cannot carry a path", raw);
        }

        Ok(HttpGateway {
            client: create_client(config.timeout_secs)?,
            collection,
        })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    /// `{collection}/{id}`, with `id` percent-encoded as a single segment
    fn item_url(&self, id: &str) -> Result<Url, GatewayError> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(format!("Cannot address {}", self.collection)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl BlogGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<BlogRecord>, GatewayError> {
        let start = Instant::now();
        let resp = self
            .client
            .get(self.collection.clone())
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        let resp = check_status(resp).await?;
        let records: Vec<BlogRecord> = resp.json().await.map_err(GatewayError::from_reqwest)?;
        tracing::debug!(count = records.len(), time_ms = elapsed_ms(start), "Listed blogs");
        Ok(records)
    }

    async fn create(&self, payload: BlogPayload) -> Result<Option<BlogRecord>, GatewayError> {
        let resp = self
            .client
            .post(self.collection.clone())
            .json(&payload)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        let resp = check_status(resp).await?;
        Ok(read_record(resp).await)
    }

    async fn update(
        &self,
        id: &str,
        payload: BlogPayload,
    ) -> Result<Option<BlogRecord>, GatewayError> {
        let resp = self
            .client
            .put(self.item_url(id)?)
            .json(&payload)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        let resp = check_status(resp).await?;
        Ok(read_record(resp).await)
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let resp = self
            .client
            .delete(self.item_url(id)?)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `GatewayError::Status`, keeping any
/// structured `message`/`error` fields from the body.
async fn check_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let raw = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %raw, "Backend rejected request");
    Err(GatewayError::Status {
        status: status.as_u16(),
        body: ErrorBody::parse(&raw),
    })
}

async fn read_record(resp: Response) -> Option<BlogRecord> {
    let raw = resp.text().await.ok()?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, "Response body is not a bare record");
            None
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Create an HTTP client; no timeout unless configured
pub fn create_client(timeout_secs: Option<u64>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("building HTTP client")
}
