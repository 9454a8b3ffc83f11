//! Immutable per-run context shared by every worker.

use uuid::Uuid;

/// Identifies one run of the generator.
///
/// The nonce is embedded in every metric name and in the `host` and
/// `service` tag values so traffic from concurrent runs never collides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    nonce: String,
}

impl RunContext {
    /// Creates a context with a fresh random nonce.
    pub fn new() -> Self {
        Self::with_nonce(Uuid::new_v4().to_string())
    }

    pub fn with_nonce(nonce: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
        }
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Metric name of the point at `index` in a worker's buffer.
    pub fn metric_name(&self, index: usize) -> String {
        format!("testing.metric.run-{}.index-{}", self.nonce, index)
    }

    pub fn host_tag(&self, host_id: u64) -> String {
        format!("host-{}-{}", self.nonce, host_id)
    }

    pub fn service_tag(&self, service_id: u64) -> String {
        format!("service-{}-{}", self.nonce, service_id)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
