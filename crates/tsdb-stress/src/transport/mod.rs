//! Pluggable transports that deliver a [`DataList`] to the target servers.
//!
//! Two strategies are provided:
//! - [`HttpTransport`]: the whole list as one JSON array in a single POST.
//!   Only a failed exchange is an error; a non-204 answer is logged and
//!   counted, never returned.
//! - [`UdpTransport`]: one datagram per point, fire-and-forget. The first
//!   failing point aborts the submission; later points are not sent.

pub mod http;
pub mod udp;

pub use http::HttpTransport;
pub use udp::{DatagramDialer, UdpDialer, UdpTransport};

use crate::config::Protocol;
use crate::error::Result;
use crate::point::DataList;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Delivers a list of points to one of the configured servers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, data: &DataList) -> Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn submit(&self, data: &DataList) -> Result<()> {
        (**self).submit(data).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn submit(&self, data: &DataList) -> Result<()> {
        (**self).submit(data).await
    }
}

/// Picks a server uniformly at random. Returns `None` only for an empty list.
pub fn choose_endpoint<'a, R: Rng + ?Sized>(servers: &'a [String], rng: &mut R) -> Option<&'a str> {
    servers.choose(rng).map(String::as_str)
}

/// Builds the transport for `protocol`, owned by worker `worker_id`.
pub fn build_transport(
    protocol: Protocol,
    worker_id: usize,
    servers: Arc<[String]>,
    port: u16,
) -> Result<Box<dyn Transport>> {
    match protocol {
        Protocol::Http => Ok(Box::new(HttpTransport::new(worker_id, servers, port)?)),
        Protocol::Udp => Ok(Box::new(UdpTransport::new(worker_id, servers, port))),
    }
}
