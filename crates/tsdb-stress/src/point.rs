//! Synthetic data points and the reusable buffer that holds them.

use crate::context::RunContext;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// One synthetic measurement.
///
/// Serializes to the `/api/put` element schema:
/// `{"metric": .., "tags": {..}, "timestamp": .., "value": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub metric: String,
    pub tags: BTreeMap<String, String>,
    pub timestamp: Timestamp,
    pub value: i64,
}

impl DataPoint {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ..Default::default()
        }
    }

    /// Draws a new non-negative value and stamps the point with the current second.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.value = rng.gen_range(0..=i64::MAX);
        self.timestamp = chrono::Utc::now().timestamp();
    }

    /// Upserts the `host`, `service` and `ksid` tags, keeping any other tags.
    pub fn apply_default_tags(&mut self, host: &str, service: &str, keyspace: &str) {
        upsert_tag(&mut self.tags, "host", host);
        upsert_tag(&mut self.tags, "service", service);
        upsert_tag(&mut self.tags, "ksid", keyspace);
    }
}

// Reuses the existing value allocation when the key is already present.
fn upsert_tag(tags: &mut BTreeMap<String, String>, key: &str, value: &str) {
    match tags.get_mut(key) {
        Some(existing) => {
            existing.clear();
            existing.push_str(value);
        }
        None => {
            tags.insert(key.to_string(), value.to_string());
        }
    }
}

/// Fixed-size, ordered buffer of points owned by a single worker.
///
/// Allocated once per worker and mutated in place on every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataList {
    points: Vec<DataPoint>,
}

impl DataList {
    /// Allocates `size` points whose metric names embed the run nonce and
    /// their position in the buffer.
    pub fn new(ctx: &RunContext, size: usize) -> Self {
        let points = (0..size).map(|i| DataPoint::new(ctx.metric_name(i))).collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DataPoint> {
        self.points.iter_mut()
    }

    /// Retags and re-randomizes every point for the next submission.
    pub fn refresh<R: Rng + ?Sized>(
        &mut self,
        host: &str,
        service: &str,
        keyspace: &str,
        rng: &mut R,
    ) {
        for point in &mut self.points {
            point.apply_default_tags(host, service, keyspace);
            point.randomize(rng);
        }
    }
}

impl From<Vec<DataPoint>> for DataList {
    fn from(points: Vec<DataPoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a DataList {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
