//! Batch transport: the whole list in one HTTP POST to `/api/put`.

use super::{choose_endpoint, Transport};
use crate::error::{Result, TransportError};
use crate::point::DataList;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Sends each [`DataList`] as a single JSON array.
///
/// Success is signalled by `204 No Content`. Any other status is a
/// rejection: it is logged with the response body and counted, but
/// `submit` still returns `Ok`. Only serialization and transport
/// failures become errors.
pub struct HttpTransport {
    worker_id: usize,
    client: reqwest::Client,
    servers: Arc<[String]>,
    port: u16,
    rejections: AtomicU64,
}

impl HttpTransport {
    pub fn new(worker_id: usize, servers: Arc<[String]>, port: u16) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            worker_id,
            client,
            servers,
            port,
            rejections: AtomicU64::new(0),
        })
    }

    /// Number of exchanges answered with something other than 204.
    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }

    fn put_url(&self, hostname: &str) -> String {
        format!("http://{}:{}/api/put", hostname, self.port)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, data: &DataList) -> Result<()> {
        let hostname = choose_endpoint(&self.servers, &mut rand::thread_rng())
            .ok_or(TransportError::NoEndpoint)?;
        let url = self.put_url(hostname);
        let body = serde_json::to_vec(data)?;

        let started_at = Utc::now();
        let start = Instant::now();
        let result = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;
        let elapsed = start.elapsed();
        let ended_at = Utc::now();

        debug!(
            worker = self.worker_id,
            "Start time: {}",
            started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        debug!(
            worker = self.worker_id,
            "End time: {}",
            ended_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                debug!(worker = self.worker_id, "Error: {}", e);
                return Err(e.into());
            }
        };

        let (host, service) = data
            .first()
            .map(|p| {
                (
                    p.tags.get("host").cloned().unwrap_or_default(),
                    p.tags.get("service").cloned().unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            // Drain so the connection goes back to the pool.
            let _ = response.bytes().await;
            info!(
                worker = self.worker_id,
                method = "http",
                elapsed_ms = elapsed.as_millis() as u64,
                %host,
                %service,
                "Request executed"
            );
        } else {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            let body = response.text().await.unwrap_or_default();
            error!(
                worker = self.worker_id,
                method = "http",
                status = status.as_u16(),
                %host,
                %service,
                %body,
                "Request failed"
            );
        }

        Ok(())
    }
}
