//! Per-point transport: one unacknowledged UDP datagram per point.

use super::{choose_endpoint, Transport};
use crate::error::{Result, TransportError};
use crate::point::DataList;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info};

/// Delivers one datagram to an endpoint of the form `host:port`.
#[async_trait]
pub trait DatagramDialer: Send + Sync {
    async fn send(&self, endpoint: &str, payload: &[u8]) -> Result<()>;
}

/// Opens a fresh socket for every datagram.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpDialer;

#[async_trait]
impl DatagramDialer for UdpDialer {
    async fn send(&self, endpoint: &str, payload: &[u8]) -> Result<()> {
        let remote = lookup_host(endpoint)
            .await?
            .next()
            .ok_or_else(|| TransportError::Resolve(endpoint.to_string()))?;

        let local: SocketAddr = if remote.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        socket.send(payload).await?;
        Ok(())
    }
}

/// Sends every point of a [`DataList`] as its own JSON datagram.
///
/// Each point gets an independently chosen server. Points are sent in
/// order and the first failure is returned immediately: earlier points
/// stay sent, later points are skipped for this submission.
pub struct UdpTransport<D = UdpDialer> {
    worker_id: usize,
    servers: Arc<[String]>,
    port: u16,
    dialer: D,
}

impl UdpTransport<UdpDialer> {
    pub fn new(worker_id: usize, servers: Arc<[String]>, port: u16) -> Self {
        Self::with_dialer(worker_id, servers, port, UdpDialer)
    }
}

impl<D: DatagramDialer> UdpTransport<D> {
    pub fn with_dialer(worker_id: usize, servers: Arc<[String]>, port: u16, dialer: D) -> Self {
        Self {
            worker_id,
            servers,
            port,
            dialer,
        }
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }
}

#[async_trait]
impl<D: DatagramDialer> Transport for UdpTransport<D> {
    async fn submit(&self, data: &DataList) -> Result<()> {
        for point in data {
            let hostname = choose_endpoint(&self.servers, &mut rand::thread_rng())
                .ok_or(TransportError::NoEndpoint)?;
            let endpoint = format!("{}:{}", hostname, self.port);
            let payload = serde_json::to_vec(point)?;

            let started_at = Utc::now();
            let start = Instant::now();
            if let Err(e) = self.dialer.send(&endpoint, &payload).await {
                debug!(worker = self.worker_id, "Error: {}", e);
                return Err(e);
            }
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
            info!(
                worker = self.worker_id,
                server = hostname,
                method = "udp",
                elapsed_us = elapsed.as_micros() as u64,
                "Request executed"
            );
        }

        Ok(())
    }
}
