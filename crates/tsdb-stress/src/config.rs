//! Run configuration for the load generator.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points sent per submission.
pub const DEFAULT_DATASET_SIZE: usize = 768;
/// Distinct `host` tag values cycled through by each pass.
pub const DEFAULT_HOST_COUNT: u64 = 100;
/// Distinct `service` tag values per host.
pub const DEFAULT_SERVICE_COUNT: u64 = 10;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_KEYSPACE: &str = "stats";
pub const DEFAULT_WORKERS: usize = 1;

/// Wire protocol used to submit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// One JSON array per submission, POSTed to `/api/put`
    Http,
    /// One JSON object per point, one datagram each
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "udp" => Ok(Protocol::Udp),
            other => Err(ConfigError::UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the traffic produced by one generator pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficShape {
    /// Number of points in each worker's buffer
    pub dataset_size: usize,

    /// Number of host ids cycled through
    pub host_count: u64,

    /// Number of service ids per host
    pub service_count: u64,

    /// Value of the `ksid` tag
    pub keyspace: String,
}

impl Default for TrafficShape {
    fn default() -> Self {
        Self {
            dataset_size: DEFAULT_DATASET_SIZE,
            host_count: DEFAULT_HOST_COUNT,
            service_count: DEFAULT_SERVICE_COUNT,
            keyspace: DEFAULT_KEYSPACE.to_string(),
        }
    }
}

/// Main configuration for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target hostnames; one is picked at random per exchange
    pub servers: Vec<String>,

    /// Port shared by every server
    pub port: u16,

    pub protocol: Protocol,

    /// Number of parallel workers
    pub workers: usize,

    pub shape: TrafficShape,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            port: DEFAULT_PORT,
            protocol: Protocol::Http,
            workers: DEFAULT_WORKERS,
            shape: TrafficShape::default(),
        }
    }
}

impl Config {
    /// Checks the configuration before any worker is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::NoServers);
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidCount("worker count"));
        }
        if self.shape.dataset_size == 0 {
            return Err(ConfigError::InvalidCount("dataset size"));
        }
        if self.shape.host_count == 0 {
            return Err(ConfigError::InvalidCount("host count"));
        }
        if self.shape.service_count == 0 {
            return Err(ConfigError::InvalidCount("service count"));
        }
        Ok(())
    }
}
