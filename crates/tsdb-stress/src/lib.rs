//! Continuous synthetic load generator for time series ingestion endpoints.
//!
//! Workers fabricate tagged integer points and submit them forever to one
//! or more servers, either batched over HTTP or one UDP datagram per point.
//!
//! # Traffic shape
//! Each worker owns a buffer of `dataset` points. A generator pass walks
//! `hosts + 1` host ids from a random offset (the first id is revisited at
//! the end) crossed with `services` service ids, retagging and
//! re-randomizing the buffer and submitting it once per pair.
//!
//! # Wire formats
//! - `http`: `POST http://<server>:<port>/api/put` with a JSON array of
//!   points. `204 No Content` is success; other statuses are logged.
//! - `udp`: one datagram per point to `<server>:<port>` holding the JSON
//!   object of that point.
//!
//! # Usage
//! ```bash
//! # Two workers, batches of 768 points over HTTP
//! tsdb-stress --workers 2 tsdb-1.internal tsdb-2.internal
//!
//! # Per-point datagrams
//! tsdb-stress --protocol udp --port 4242 --dataset 64 localhost
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod point;
pub mod transport;
pub mod worker;
pub mod workload;

pub use config::{Config, Protocol, TrafficShape};
pub use context::RunContext;
pub use error::{ConfigError, Result, TransportError};
pub use point::{DataList, DataPoint, Timestamp};
pub use transport::{build_transport, choose_endpoint, HttpTransport, Transport, UdpTransport};
pub use worker::{run_worker, Dispatcher};
pub use workload::{host_sequence, run_pass, run_pass_from, submissions_per_pass};
